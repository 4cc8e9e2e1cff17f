use axum::{Router, routing::post};
use std::sync::Arc;

use crate::server::AppState;

mod chat;
mod contact;
mod session;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat/message", post(chat::send_message))
        .route("/chat/ask", post(chat::ask))
        .route("/chat/session", post(session::create_session))
        .route("/contact", post(contact::send_contact))
}
