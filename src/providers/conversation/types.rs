use serde::{Deserialize, Serialize};

use crate::providers::outcome::UpstreamPayload;

/// Inbound chat body. Accepts both the current field names and the legacy
/// `previousResponseId` / `useFileSearch` spelling, but not both spellings of
/// one field in the same body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default, alias = "previousResponseId")]
    pub continuation_token: Option<String>,
    #[serde(default, alias = "useFileSearch")]
    pub use_retrieval: Option<bool>,
}

/// The single shape the conversation backend receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalPayload {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    pub use_file_search: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(default)]
    pub output_text: String,
    /// Anything else the backend returned (response ids and the like).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UpstreamPayload for ChatResponse {
    fn is_usable(&self) -> bool {
        !self.output_text.trim().is_empty()
    }
}
