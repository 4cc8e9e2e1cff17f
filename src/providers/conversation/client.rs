use crate::config::ChatProfile;
use crate::error::GatewayError;
use crate::http_client::{OutboundRequest, Transport};
use crate::providers::outcome::{Upstream, UpstreamOutcome};

use super::normalize::normalize;
use super::types::{ChatRequest, ChatResponse};

pub struct ConversationProvider;

impl ConversationProvider {
    /// Validate, resolve the backend, forward once and translate the answer.
    pub async fn send(
        transport: &dyn Transport,
        profile: &ChatProfile,
        request: ChatRequest,
    ) -> Result<ChatResponse, GatewayError> {
        let payload = normalize(request, profile.default_use_file_search)?;
        let endpoint = profile.endpoint()?;

        let body = serde_json::to_value(&payload)?;
        let mut outbound = OutboundRequest::new(endpoint, body, profile.timeout);
        if let Some(key) = profile.api_key() {
            outbound = outbound.bearer(key);
        }

        tracing::debug!(
            endpoint,
            continuation = payload.previous_response_id.is_some(),
            use_file_search = payload.use_file_search,
            "forwarding chat prompt"
        );

        let reply = transport.post_json(outbound).await;
        if let Ok(raw) = &reply {
            if !raw.status.is_success() {
                tracing::warn!(
                    "Conversation API returned status {}. Body: {}",
                    raw.status,
                    raw.body
                );
            }
        }

        let outcome = UpstreamOutcome::<ChatResponse>::from_reply(reply);
        if matches!(outcome, UpstreamOutcome::Malformed) {
            tracing::warn!("Conversation API response missing output text");
        }
        outcome.into_result(Upstream::Conversation)
    }
}
