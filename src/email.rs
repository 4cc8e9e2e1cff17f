use async_trait::async_trait;
use resend_rs::{Resend, types::CreateEmailBaseOptions};
use serde::Deserialize;
use thiserror::Error;

use crate::config::settings::{EmailSettings, non_blank};
use crate::error::ValidationError;

const MAX_NAME_LEN: usize = 150;
const MAX_SUBJECT_LEN: usize = 150;
const MAX_MESSAGE_LEN: usize = 4000;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("email delivery is not configured")]
    NotConfigured,

    #[error("email provider rejected the message: {0}")]
    Provider(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactMessage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

fn looks_like_email(addr: &str) -> bool {
    let Some((local, domain)) = addr.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !addr.chars().any(char::is_whitespace)
}

fn check_len(
    field: &'static str,
    value: &str,
    max: usize,
    missing: &'static str,
    too_long: &'static str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field,
            reason: missing,
        });
    }
    if value.chars().count() > max {
        return Err(ValidationError::InvalidField {
            field,
            reason: too_long,
        });
    }
    Ok(())
}

impl ContactMessage {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_len("name", &self.name, MAX_NAME_LEN, "is required", "must be at most 150 characters")?;
        if self.email.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "email",
                reason: "is required",
            });
        }
        if !looks_like_email(self.email.trim()) {
            return Err(ValidationError::InvalidField {
                field: "email",
                reason: "is not a valid address",
            });
        }
        check_len(
            "subject",
            &self.subject,
            MAX_SUBJECT_LEN,
            "is required",
            "must be at most 150 characters",
        )?;
        check_len(
            "message",
            &self.message,
            MAX_MESSAGE_LEN,
            "is required",
            "must be at most 4000 characters",
        )?;
        Ok(())
    }

    pub fn formatted_subject(&self) -> String {
        match non_blank(Some(self.subject.as_str())) {
            Some(s) => format!("New contact: {}", s.trim()),
            None => "New contact received through the site".to_string(),
        }
    }

    pub fn plain_text_body(&self) -> String {
        format!(
            "Name: {}\nEmail: {}\nSubject: {}\n\n{}",
            self.name, self.email, self.subject, self.message
        )
    }
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_contact(&self, message: &ContactMessage) -> Result<(), DeliveryError>;
}

pub struct ResendEmailSender {
    client: Resend,
    from: String,
    to: String,
}

impl ResendEmailSender {
    /// `None` unless API key, sender and recipient are all present.
    pub fn from_settings(settings: &EmailSettings) -> Option<Self> {
        let api_key = non_blank(settings.resend_api_key.as_deref())?;
        let from = non_blank(settings.from.as_deref())?;
        let to = non_blank(settings.to.as_deref())?;
        Some(Self {
            client: Resend::new(api_key),
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send_contact(&self, message: &ContactMessage) -> Result<(), DeliveryError> {
        let subject = message.formatted_subject();
        let email = CreateEmailBaseOptions::new(self.from.as_str(), [self.to.clone()], subject.as_str())
            .with_text(&message.plain_text_body())
            .with_reply(message.email.trim());

        self.client
            .emails
            .send(email)
            .await
            .map_err(|e| DeliveryError::Provider(e.to_string()))?;

        tracing::info!(reply_to = %message.email, "contact email sent");
        Ok(())
    }
}

/// Used when Resend is not configured; every send fails.
pub struct DisabledEmailSender;

#[async_trait]
impl EmailSender for DisabledEmailSender {
    async fn send_contact(&self, _message: &ContactMessage) -> Result<(), DeliveryError> {
        tracing::warn!("RESEND_API_KEY/CONTACT_EMAIL_FROM/CONTACT_EMAIL_TO not configured; contact email not sent");
        Err(DeliveryError::NotConfigured)
    }
}
