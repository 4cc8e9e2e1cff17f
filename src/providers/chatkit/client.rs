use uuid::Uuid;

use crate::config::Settings;
use crate::config::settings::non_blank;
use crate::error::GatewayError;
use crate::http_client::{OutboundRequest, Transport};
use crate::providers::outcome::{Upstream, UpstreamOutcome};

use super::types::{SessionPayload, SessionRequest, SessionSecret, WorkflowRef};

pub const BETA_HEADER: &str = "OpenAI-Beta";
pub const BETA_HEADER_VALUE: &str = "chatkit_beta=v1";

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}****{}", head, tail)
}

/// Caller-supplied device id if present, otherwise a fresh random one.
pub fn resolve_identity(request: &SessionRequest) -> String {
    match non_blank(request.device_id.as_deref()) {
        Some(id) => id.to_string(),
        None => Uuid::new_v4().simple().to_string(),
    }
}

pub struct ChatKitProvider;

impl ChatKitProvider {
    pub async fn create_session(
        transport: &dyn Transport,
        settings: &Settings,
        request: SessionRequest,
    ) -> Result<SessionSecret, GatewayError> {
        let workflow_id = settings.chatkit_workflow_id()?;
        let api_key = settings.chatkit_api_key().inspect_err(|_| {
            tracing::error!("ChatKit API key is not configured");
        })?;

        let payload = SessionPayload {
            workflow: WorkflowRef {
                id: workflow_id.to_string(),
                version: settings.chatkit_workflow_version().map(str::to_string),
            },
            user: resolve_identity(&request),
        };

        let endpoint = settings.chatkit_session_endpoint();
        tracing::debug!(
            endpoint,
            workflow = workflow_id,
            key = %mask_key(api_key),
            "requesting ChatKit session"
        );

        let outbound = OutboundRequest::new(
            endpoint,
            serde_json::to_value(&payload)?,
            settings.chatkit_timeout(),
        )
        .bearer(api_key)
        .header(BETA_HEADER, BETA_HEADER_VALUE);

        let reply = transport.post_json(outbound).await;
        if let Ok(raw) = &reply {
            if !raw.status.is_success() {
                tracing::warn!(
                    "ChatKit session creation failed with status {}. Payload: {}",
                    raw.status,
                    raw.body
                );
            }
        }

        let outcome = UpstreamOutcome::<SessionSecret>::from_reply(reply);
        if matches!(outcome, UpstreamOutcome::Malformed) {
            tracing::warn!("ChatKit response did not contain a client secret");
        }
        outcome.into_result(Upstream::ChatKit)
    }
}
