use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::email::ContactMessage;
use crate::error::{Result as AppResult, ValidationError};
use crate::server::AppState;

pub async fn send_contact(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ContactMessage>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let Json(message) = payload.map_err(ValidationError::from)?;
    message.validate()?;

    app_state.mailer.send_contact(&message).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({"message": "Thanks! Your message has been sent."})),
    ))
}
