//! Signed token configuration.

use super::Secret;

#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC secret for every token the server issues.
    pub secret: Secret,
}
