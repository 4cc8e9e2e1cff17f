use crate::config::settings::non_blank;
use crate::error::ValidationError;

use super::types::{CanonicalPayload, ChatRequest};

/// Turns any accepted inbound shape into the canonical backend payload.
/// `default_use_file_search` comes from the route's profile.
pub fn normalize(
    request: ChatRequest,
    default_use_file_search: bool,
) -> Result<CanonicalPayload, ValidationError> {
    let prompt = match request.prompt {
        Some(p) if !p.trim().is_empty() => p,
        _ => return Err(ValidationError::MissingPrompt),
    };

    let previous_response_id = non_blank(request.continuation_token.as_deref()).map(str::to_string);

    Ok(CanonicalPayload {
        prompt,
        previous_response_id,
        use_file_search: request.use_retrieval.unwrap_or(default_use_file_search),
    })
}
