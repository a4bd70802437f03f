//! Configuration module for mrportal-server.
//!
//! Handles loading configuration from an optional TOML file, CLI arguments
//! and environment variables, and validates it into the runtime config
//! structs of `mrportal-core`.

pub mod file;

use crate::config::file::FileConfig;
use mrportal_core::config::{
    GatewayConfig, MailConfig, RuntimeConfig, Secret, ServerConfig, TokenConfig,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file, if it exists
    /// 2. Apply environment overrides
    /// 3. Apply CLI overrides
    /// 4. Validate and build the runtime configuration
    pub fn load(&self) -> Result<RuntimeConfig, ConfigError> {
        let file_config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %self.config_path.display(),
                    "Config file not found, using defaults and environment"
                );
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };
        self.build(file_config, |name| std::env::var(name).ok())
    }

    fn build(
        &self,
        mut file_config: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<RuntimeConfig, ConfigError> {
        apply_env_overrides(&mut file_config, env)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        build_runtime_config(file_config)
    }
}

fn apply_env_overrides(
    config: &mut FileConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let non_empty = |name: &str| env(name).filter(|v| !v.is_empty());
    if let Some(v) = non_empty("KEY_ID") {
        config.gateway.key_id = v;
    }
    if let Some(v) = non_empty("KEY_SECRET") {
        config.gateway.key_secret = v;
    }
    if let Some(v) = non_empty("JWT_SECRET") {
        config.tokens.secret = v;
    }
    if let Some(v) = non_empty("EMAIL_USER") {
        config.mail.user = v;
    }
    if let Some(v) = non_empty("EMAIL_PASS") {
        config.mail.password = v;
    }
    if let Some(port) = non_empty("PORT") {
        let port: u16 = port
            .parse()
            .map_err(|_| ConfigError::ValidationError(format!("PORT {port:?} is not a port")))?;
        config.server.listen.set_port(port);
    }
    Ok(())
}

fn build_runtime_config(file: FileConfig) -> Result<RuntimeConfig, ConfigError> {
    let FileConfig {
        server,
        gateway,
        tokens,
        mail,
    } = file;

    if gateway.key_id.is_empty() {
        return Err(ConfigError::Missing("gateway.key_id (KEY_ID)"));
    }
    if gateway.key_secret.is_empty() {
        return Err(ConfigError::Missing("gateway.key_secret (KEY_SECRET)"));
    }
    if tokens.secret.is_empty() {
        return Err(ConfigError::Missing("tokens.secret (JWT_SECRET)"));
    }
    if mail.user.is_empty() {
        return Err(ConfigError::Missing("mail.user (EMAIL_USER)"));
    }
    let currency = gateway.currency.trim().to_ascii_uppercase();
    if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(ConfigError::ValidationError(format!(
            "gateway.currency {:?} is not an ISO 4217 code",
            gateway.currency
        )));
    }

    let from = mail.from.unwrap_or_else(|| mail.user.clone());
    let notify_to = mail.notify_to.unwrap_or_else(|| mail.user.clone());

    Ok(RuntimeConfig {
        server: ServerConfig {
            listen: server.listen,
            uploads_dir: server.uploads_dir,
        },
        gateway: GatewayConfig {
            key_id: gateway.key_id,
            key_secret: Secret::new(gateway.key_secret),
            api_base: parse_url("gateway.api_base", &gateway.api_base)?,
            currency,
            timeout: timeout("gateway.timeout_secs", gateway.timeout_secs)?,
            require_order_token: gateway.require_order_token,
        },
        tokens: TokenConfig {
            secret: Secret::new(tokens.secret),
        },
        mail: MailConfig {
            relay_url: parse_url("mail.relay_url", &mail.relay_url)?,
            user: mail.user,
            password: Secret::new(mail.password),
            from,
            notify_to,
            timeout: timeout("mail.timeout_secs", mail.timeout_secs)?,
        },
    })
}

fn parse_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value)
        .map_err(|e| ConfigError::ValidationError(format!("{field} {value:?} is invalid: {e}")))
}

fn timeout(field: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::ValidationError(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(Duration::from_secs(secs))
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const SECRETS: &[(&str, &str)] = &[
        ("KEY_ID", "rzp_test_abc"),
        ("KEY_SECRET", "gateway-secret"),
        ("JWT_SECRET", "jwt-secret"),
        ("EMAIL_USER", "mailer@example.com"),
        ("EMAIL_PASS", "mail-pass"),
    ];

    #[test]
    fn test_environment_supplies_secrets() {
        let loader = ConfigLoader::new("unused.toml", None);
        let config = loader.build(FileConfig::default(), env(SECRETS)).unwrap();
        assert_eq!(config.gateway.key_id, "rzp_test_abc");
        assert_eq!(config.gateway.key_secret.expose(), "gateway-secret");
        assert_eq!(config.gateway.currency, "INR");
        assert_eq!(config.mail.from, "mailer@example.com");
        assert_eq!(config.mail.notify_to, "mailer@example.com");
        assert_eq!(config.mail.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_port_and_listen_overrides() {
        let mut pairs = SECRETS.to_vec();
        pairs.push(("PORT", "8081"));
        let config = ConfigLoader::new("unused.toml", None)
            .build(FileConfig::default(), env(&pairs))
            .unwrap();
        assert_eq!(config.server.listen.port(), 8081);

        let listen: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let config = ConfigLoader::new("unused.toml", Some(listen))
            .build(FileConfig::default(), env(&pairs))
            .unwrap();
        assert_eq!(config.server.listen, listen);
    }

    #[test]
    fn test_missing_secret_is_reported() {
        let pairs: Vec<_> = SECRETS
            .iter()
            .copied()
            .filter(|(k, _)| *k != "JWT_SECRET")
            .collect();
        let err = ConfigLoader::new("unused.toml", None)
            .build(FileConfig::default(), env(&pairs))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(name) if name.contains("JWT_SECRET")));
    }

    #[test]
    fn test_bad_currency_is_rejected() {
        let mut file = FileConfig::default();
        file.gateway.currency = "rupees".into();
        let err = ConfigLoader::new("unused.toml", None)
            .build(file, env(SECRETS))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::new(dir.path().join("absent.toml"), None);
        // Secrets come from the process environment here, so only the
        // failure mode is checked.
        if let Err(e) = loader.load() {
            assert!(!matches!(
                e,
                ConfigError::IoError(_) | ConfigError::ParseError(_)
            ));
        }
    }
}
