use axum::{Json, body::Bytes, extract::State};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{Result as AppResult, ValidationError};
use crate::providers::chatkit::{ChatKitProvider, SessionRequest};
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub client_secret: String,
}

/// The body is optional: an empty request simply means "no device id".
fn parse_session_request(body: &[u8]) -> Result<SessionRequest, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SessionRequest::default());
    }
    serde_json::from_slice::<Option<SessionRequest>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| ValidationError::MalformedBody(e.to_string()))
}

pub async fn create_session(
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Json<SessionResponse>> {
    let request = parse_session_request(&body)?;
    let secret =
        ChatKitProvider::create_session(app_state.transport.as_ref(), &app_state.config, request)
            .await?;
    Ok(Json(SessionResponse {
        client_secret: secret.client_secret,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::email::DisabledEmailSender;
    use crate::server::create_app;
    use crate::test_support::SpyTransport;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn state(spy: Arc<SpyTransport>, workflow_id: Option<&str>, api_key: Option<&str>) -> AppState {
        let mut config = Settings::default();
        config.chatkit.workflow_id = workflow_id.map(str::to_string);
        config.chatkit.api_key = api_key.map(str::to_string);
        AppState {
            config,
            transport: spy,
            mailer: Arc::new(DisabledEmailSender),
        }
    }

    async fn post(app_state: AppState, body: &'static str) -> (StatusCode, Value) {
        let response = create_app(app_state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat/session")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn empty_and_null_bodies_mean_no_device() {
        assert!(parse_session_request(b"").unwrap().device_id.is_none());
        assert!(parse_session_request(b"  \n").unwrap().device_id.is_none());
        assert!(parse_session_request(b"null").unwrap().device_id.is_none());
        assert_eq!(
            parse_session_request(br#"{"deviceId":"d1"}"#)
                .unwrap()
                .device_id
                .as_deref(),
            Some("d1")
        );
        assert!(parse_session_request(b"{oops").is_err());
    }

    #[tokio::test]
    async fn issues_client_secret() {
        let spy = Arc::new(SpyTransport::replying(
            StatusCode::OK,
            r#"{"client_secret":"sk_abc","expires_at":1700000000}"#,
        ));
        let (status, body) = post(state(spy.clone(), Some("wf_1"), Some("sk-key")), "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"client_secret": "sk_abc"}));
        assert_eq!(spy.calls().len(), 1);
    }

    #[tokio::test]
    async fn device_id_from_body_becomes_user() {
        let spy = Arc::new(SpyTransport::replying(StatusCode::OK, r#"{"client_secret":"s"}"#));
        let (status, _) = post(
            state(spy.clone(), Some("wf_1"), Some("sk-key")),
            r#"{"deviceId":"browser-42"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(spy.calls()[0].body["user"], "browser-42");
    }

    #[tokio::test]
    async fn missing_workflow_is_500_without_call() {
        let spy = Arc::new(SpyTransport::default());
        let (status, body) = post(state(spy.clone(), None, Some("sk-key")), "{}").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "ChatKit workflow id is not configured.");
        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_secret_in_upstream_reply_is_502() {
        let spy = Arc::new(SpyTransport::replying(StatusCode::OK, r#"{"id":"cksess_1"}"#));
        let (status, _) = post(state(spy, Some("wf_1"), Some("sk-key")), "{}").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn upstream_rejection_is_mirrored_with_detail() {
        let spy = Arc::new(SpyTransport::replying(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"message":"unknown workflow"}}"#,
        ));
        let (status, body) = post(state(spy, Some("wf_1"), Some("sk-key")), "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"]["error"]["message"], "unknown workflow");
    }
}
