use serde::{Deserialize, Serialize};

use crate::providers::outcome::UpstreamPayload;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowRef {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionPayload {
    pub workflow: WorkflowRef,
    pub user: String,
}

/// Ephemeral secret handed to the widget. Never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSecret {
    #[serde(default)]
    pub client_secret: String,
}

impl UpstreamPayload for SessionSecret {
    fn is_usable(&self) -> bool {
        !self.client_secret.trim().is_empty()
    }
}
