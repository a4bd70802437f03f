use super::{MailError, MailRelay, OutgoingMail};
use crate::config::{MailConfig, Secret};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Mail relay reached over an HTTP JSON API with basic auth.
#[derive(Debug, Clone)]
pub struct HttpMailRelay {
    client: Client,
    relay_url: Url,
    user: String,
    password: Secret,
}

impl HttpMailRelay {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            relay_url: config.relay_url.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }
}

#[async_trait]
impl MailRelay for HttpMailRelay {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let response = self
            .client
            .post(self.relay_url.clone())
            .basic_auth(&self.user, Some(self.password.expose()))
            .json(mail)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(to = %mail.to, subject = %mail.subject, "Mail accepted by relay");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
