pub mod handlers;

use crate::config::Settings;
use crate::email::{DisabledEmailSender, EmailSender, ResendEmailSender};
use crate::error::Result as AppResult;
use crate::http_client::{ReqwestTransport, Transport};
use axum::Router;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Settings,
    pub transport: Arc<dyn Transport + Send + Sync>,
    pub mailer: Arc<dyn EmailSender + Send + Sync>,
}

impl AppState {
    pub fn from_settings(config: Settings) -> AppResult<Self> {
        let transport = ReqwestTransport::new()?;

        let mailer: Arc<dyn EmailSender + Send + Sync> =
            match ResendEmailSender::from_settings(&config.email) {
                Some(sender) => {
                    tracing::info!("contact email delivery enabled via Resend");
                    Arc::new(sender)
                }
                None => {
                    tracing::warn!("contact email delivery disabled; Resend settings incomplete");
                    Arc::new(DisabledEmailSender)
                }
            };

        Ok(Self {
            config,
            transport: Arc::new(transport),
            mailer,
        })
    }
}

pub fn create_app(app_state: AppState) -> Router {
    let mut app = handlers::routes().with_state(Arc::new(app_state));

    // The browser only ever talks to us; upstream URLs and keys stay server-side.
    use axum::http::{Method, header};
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;
    let cors = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any);
    app = app.layer(cors).layer(TraceLayer::new_for_http());

    app
}
