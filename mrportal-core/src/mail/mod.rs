//! Transactional e-mail.

pub mod compose;
mod http;

pub use http::HttpMailRelay;

use crate::entities::notifications::Notification;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail relay timed out")]
    Timeout,

    #[error("mail relay transport error: {0}")]
    Transport(reqwest::Error),

    /// The relay refused the message.
    #[error("mail relay rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl From<reqwest::Error> for MailError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MailError::Timeout
        } else {
            MailError::Transport(e)
        }
    }
}

/// A message ready to hand to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl OutgoingMail {
    pub fn from_notification(notification: &Notification, from: &str) -> Self {
        Self {
            from: from.to_string(),
            to: notification.recipient.clone(),
            subject: notification.subject.clone(),
            html: notification.html_body.clone(),
            text: notification.text_body.clone(),
        }
    }
}

#[async_trait]
pub trait MailRelay: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}
