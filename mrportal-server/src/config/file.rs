//! TOML file configuration structures.
//!
//! These structs directly map to the `mrportal-config.toml` file format.
//! Every section is optional; secrets are usually supplied through the
//! environment instead (see [`super::ConfigLoader`]).

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub tokens: TokensConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:3000").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
    /// Directory uploaded files are written to.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            uploads_dir: default_uploads_dir(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

/// Payment gateway section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// API key id. Overridden by `KEY_ID`.
    #[serde(default)]
    pub key_id: String,
    /// API key secret, also the payment signature key. Overridden by `KEY_SECRET`.
    #[serde(default)]
    pub key_secret: String,
    #[serde(default = "default_gateway_api_base")]
    pub api_base: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Reject `/verify-payment` requests without an order token.
    #[serde(default)]
    pub require_order_token: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            key_id: String::new(),
            key_secret: String::new(),
            api_base: default_gateway_api_base(),
            currency: default_currency(),
            timeout_secs: default_timeout_secs(),
            require_order_token: false,
        }
    }
}

fn default_gateway_api_base() -> String {
    "https://api.razorpay.com/v1".to_string()
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

/// Signed token section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokensConfig {
    /// HS256 secret. Overridden by `JWT_SECRET`.
    #[serde(default)]
    pub secret: String,
}

/// Mail relay section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    /// Relay user. Overridden by `EMAIL_USER`.
    #[serde(default)]
    pub user: String,
    /// Relay password. Overridden by `EMAIL_PASS`.
    #[serde(default)]
    pub password: String,
    /// Sender address; defaults to the relay user.
    #[serde(default)]
    pub from: Option<String>,
    /// Inbox receiving contact form notifications; defaults to the relay user.
    #[serde(default)]
    pub notify_to: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            user: String::new(),
            password: String::new(),
            from: None,
            notify_to: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_relay_url() -> String {
    "http://127.0.0.1:8025/api/send".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:4000"
uploads_dir = "/var/lib/mrportal/uploads"

[gateway]
key_id = "rzp_test_abc"
key_secret = "secret"
currency = "USD"
timeout_secs = 5
require_order_token = true

[tokens]
secret = "jwt-secret"

[mail]
relay_url = "https://relay.example.com/send"
user = "mailer@example.com"
password = "pw"
notify_to = "sales@example.com"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 4000);
        assert_eq!(config.gateway.currency, "USD");
        assert!(config.gateway.require_order_token);
        assert_eq!(config.mail.notify_to.as_deref(), Some("sales@example.com"));
        assert_eq!(config.mail.from, None);
        assert_eq!(config.mail.timeout_secs, 15);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.gateway.currency, "INR");
        assert_eq!(config.gateway.api_base, "https://api.razorpay.com/v1");
        assert!(config.tokens.secret.is_empty());
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        assert!(toml::from_str::<FileConfig>("[admin]\nsecret = \"x\"").is_err());
    }
}
