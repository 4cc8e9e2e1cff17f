use std::fmt;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::GatewayError;
use crate::http_client::{RawReply, TransportError};

/// Which backend a call went to; only used to label errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Conversation,
    ChatKit,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Upstream::Conversation => f.write_str("conversation API"),
            Upstream::ChatKit => f.write_str("ChatKit"),
        }
    }
}

/// Best-effort rendering of an upstream error body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Json(serde_json::Value),
    Text(String),
}

impl ErrorDetail {
    pub fn parse(body: &str) -> Option<Self> {
        if body.trim().is_empty() {
            return None;
        }
        Some(match serde_json::from_str::<serde_json::Value>(body) {
            Ok(v) => ErrorDetail::Json(v),
            Err(_) => ErrorDetail::Text(body.to_string()),
        })
    }
}

/// A success body only counts if the field the caller needs is actually there.
pub trait UpstreamPayload: DeserializeOwned {
    fn is_usable(&self) -> bool;
}

#[derive(Debug)]
pub enum UpstreamOutcome<T> {
    Success(T),
    Rejected {
        status: StatusCode,
        detail: Option<ErrorDetail>,
    },
    Failure {
        status: StatusCode,
        detail: Option<ErrorDetail>,
    },
    Malformed,
    Transport(TransportError),
}

pub fn translate<T: UpstreamPayload>(status: StatusCode, body: &str) -> UpstreamOutcome<T> {
    if !status.is_success() {
        let detail = ErrorDetail::parse(body);
        return if status.is_client_error() {
            UpstreamOutcome::Rejected { status, detail }
        } else {
            UpstreamOutcome::Failure { status, detail }
        };
    }

    match serde_json::from_str::<T>(body) {
        Ok(parsed) if parsed.is_usable() => UpstreamOutcome::Success(parsed),
        _ => UpstreamOutcome::Malformed,
    }
}

impl<T: UpstreamPayload> UpstreamOutcome<T> {
    pub fn from_reply(reply: Result<RawReply, TransportError>) -> Self {
        match reply {
            Ok(raw) => translate(raw.status, &raw.body),
            Err(e) => UpstreamOutcome::Transport(e),
        }
    }
}

impl<T> UpstreamOutcome<T> {
    pub fn into_result(self, upstream: Upstream) -> Result<T, GatewayError> {
        match self {
            UpstreamOutcome::Success(v) => Ok(v),
            UpstreamOutcome::Rejected { status, detail } => Err(GatewayError::UpstreamRejected {
                upstream,
                status,
                detail,
            }),
            UpstreamOutcome::Failure { status, detail } => Err(GatewayError::UpstreamFailure {
                upstream,
                status,
                detail,
            }),
            UpstreamOutcome::Malformed => Err(GatewayError::MalformedResponse { upstream }),
            UpstreamOutcome::Transport(source) => Err(GatewayError::Transport { upstream, source }),
        }
    }
}
