//! Configuration types for the report portal.
//!
//! These types represent the validated runtime configuration used by the server
//! and can be shared across crates. The actual config loading/parsing is handled
//! by the server crate.

mod gateway;
mod mail;
mod secret;
mod server;
mod tokens;

pub use gateway::GatewayConfig;
pub use mail::MailConfig;
pub use secret::Secret;
pub use server::ServerConfig;
pub use tokens::TokenConfig;

/// Every section of the runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub tokens: TokenConfig,
    pub mail: MailConfig,
}
