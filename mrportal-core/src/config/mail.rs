//! Mail relay configuration.

use std::time::Duration;
use url::Url;

use super::Secret;

/// Settings for the transactional mail relay.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Endpoint messages are POSTed to.
    pub relay_url: Url,
    pub user: String,
    pub password: Secret,
    /// Sender address of every outgoing message.
    pub from: String,
    /// Inbox that receives contact form notifications.
    pub notify_to: String,
    pub timeout: Duration,
}
