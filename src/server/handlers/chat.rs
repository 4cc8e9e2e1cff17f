use axum::{Json, extract::State, extract::rejection::JsonRejection};
use std::sync::Arc;

use crate::config::ChatRoute;
use crate::error::{Result as AppResult, ValidationError};
use crate::providers::conversation::{ChatRequest, ChatResponse, ConversationProvider};
use crate::server::AppState;

async fn forward(
    app_state: &AppState,
    route: ChatRoute,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let Json(request) = payload.map_err(ValidationError::from)?;
    let profile = app_state.config.chat_profile(route);
    let response =
        ConversationProvider::send(app_state.transport.as_ref(), &profile, request).await?;
    Ok(Json(response))
}

pub async fn send_message(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    forward(&app_state, ChatRoute::Message, payload).await
}

/// Legacy contract: file search defaults on.
pub async fn ask(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    forward(&app_state, ChatRoute::Ask, payload).await
}

#[cfg(test)]
mod tests {
    use crate::config::Settings;
    use crate::email::DisabledEmailSender;
    use crate::http_client::TransportError;
    use crate::server::{AppState, create_app};
    use crate::test_support::SpyTransport;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state(spy: Arc<SpyTransport>) -> AppState {
        let mut config = Settings::default();
        config.conversation.endpoint = Some("https://conversation.example/ask".into());
        AppState {
            config,
            transport: spy,
            mailer: Arc::new(DisabledEmailSender),
        }
    }

    async fn post(app_state: AppState, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = create_app(app_state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn missing_prompt_is_400_and_upstream_untouched() {
        let spy = Arc::new(SpyTransport::default());
        let (status, body) = post(state(spy.clone()), "/chat/message", r#"{"prompt":"  "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "prompt is required"}));

        let (status, _) = post(state(spy.clone()), "/chat/message", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn unparseable_body_is_400() {
        let spy = Arc::new(SpyTransport::default());
        let (status, body) = post(state(spy.clone()), "/chat/message", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .starts_with("malformed request body:")
        );
        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn both_spellings_of_a_field_are_reported_as_duplicates() {
        let spy = Arc::new(SpyTransport::default());
        let (status, body) = post(
            state(spy.clone()),
            "/chat/message",
            r#"{"prompt":"Hello","continuationToken":"a","previousResponseId":"b"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("duplicate field"));
        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn message_round_trip() {
        let spy = Arc::new(SpyTransport::replying(
            StatusCode::OK,
            r#"{"outputText":"Hello back"}"#,
        ));
        let (status, body) = post(
            state(spy.clone()),
            "/chat/message",
            r#"{"prompt":"Hello","continuationToken":"resp_1"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"outputText": "Hello back"}));
        assert_eq!(
            spy.calls()[0].body,
            json!({"prompt": "Hello", "previousResponseId": "resp_1", "useFileSearch": false})
        );
    }

    #[tokio::test]
    async fn ask_route_defaults_file_search_on() {
        let spy = Arc::new(SpyTransport::replying(StatusCode::OK, r#"{"outputText":"ok"}"#));
        let (status, _) = post(state(spy.clone()), "/chat/ask", r#"{"prompt":"Hello"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(spy.calls()[0].body["useFileSearch"], json!(true));
    }

    #[tokio::test]
    async fn upstream_rejection_is_mirrored() {
        let spy = Arc::new(SpyTransport::replying(
            StatusCode::NOT_FOUND,
            r#"{"error":"not found"}"#,
        ));
        let (status, body) = post(state(spy), "/chat/message", r#"{"prompt":"Hello"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], json!({"error": "not found"}));
    }

    #[tokio::test]
    async fn blank_output_is_502() {
        let spy = Arc::new(SpyTransport::replying(StatusCode::OK, r#"{"outputText":""}"#));
        let (status, _) = post(state(spy), "/chat/message", r#"{"prompt":"Hello"}"#).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn transport_failure_is_500_without_internals() {
        let spy = Arc::new(SpyTransport::failing(TransportError::Connect {
            cause: "tcp connect error: Connection refused (os error 111)".into(),
        }));
        let (status, body) = post(state(spy), "/chat/message", r#"{"prompt":"Hello"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "could not connect to upstream");
        assert!(!body.to_string().contains("os error"));
    }

    #[tokio::test]
    async fn missing_endpoint_is_500() {
        let spy = Arc::new(SpyTransport::default());
        let mut app_state = state(spy.clone());
        app_state.config.conversation.endpoint = None;
        let (status, body) = post(app_state, "/chat/message", r#"{"prompt":"Hello"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "conversation API endpoint is not configured.");
        assert!(spy.calls().is_empty());
    }
}
