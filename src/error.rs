use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::email::DeliveryError;
use crate::http_client::TransportError;
use crate::providers::outcome::{ErrorDetail, Upstream};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("prompt is required")]
    MissingPrompt,

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("{field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

impl From<JsonRejection> for ValidationError {
    fn from(rejection: JsonRejection) -> Self {
        ValidationError::MalformedBody(rejection.body_text())
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{upstream} rejected the request with status {status}")]
    UpstreamRejected {
        upstream: Upstream,
        status: StatusCode,
        detail: Option<ErrorDetail>,
    },

    #[error("{upstream} failed with status {status}")]
    UpstreamFailure {
        upstream: Upstream,
        status: StatusCode,
        detail: Option<ErrorDetail>,
    },

    #[error("{upstream} returned an unusable response")]
    MalformedResponse { upstream: Upstream },

    #[error("{upstream} transport error: {source}")]
    Transport {
        upstream: Upstream,
        #[source]
        source: TransportError,
    },

    #[error("Email delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<ErrorDetail>,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::UpstreamRejected { status, .. }
            | GatewayError::UpstreamFailure { status, .. } => *status,
            GatewayError::MalformedResponse { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::Transport { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Delivery(_) | GatewayError::Http(_) | GatewayError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn into_body(self) -> ErrorBody {
        match self {
            GatewayError::Validation(e) => ErrorBody {
                message: e.to_string(),
                detail: None,
            },
            GatewayError::Config(ConfigError::MissingRequiredSetting(name)) => ErrorBody {
                message: format!("{} is not configured.", name),
                detail: None,
            },
            GatewayError::Config(_) => ErrorBody {
                message: "Gateway configuration error.".into(),
                detail: None,
            },
            GatewayError::UpstreamRejected { upstream, detail, .. }
            | GatewayError::UpstreamFailure { upstream, detail, .. } => ErrorBody {
                message: format!("{} request failed.", upstream),
                detail,
            },
            GatewayError::MalformedResponse { upstream } => ErrorBody {
                message: format!("Invalid response from {}.", upstream),
                detail: None,
            },
            GatewayError::Transport { upstream, source } => ErrorBody {
                message: format!("Internal error while contacting {}.", upstream),
                detail: Some(ErrorDetail::Text(source.to_string())),
            },
            GatewayError::Delivery(_) => ErrorBody {
                message: "Could not send your message right now. Please try again shortly.".into(),
                detail: None,
            },
            GatewayError::Http(_) | GatewayError::Json(_) => ErrorBody {
                message: "Internal gateway error.".into(),
                detail: None,
            },
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            GatewayError::Validation(_) => tracing::debug!("client error: {}", self),
            GatewayError::UpstreamRejected { .. } | GatewayError::UpstreamFailure { .. } => {
                tracing::warn!("{}", self)
            }
            GatewayError::Transport { source, .. } => {
                tracing::error!(cause = %source.cause(), "{}", self)
            }
            _ => tracing::error!("{}", self),
        }
        (status, Json(self.into_body())).into_response()
    }
}
