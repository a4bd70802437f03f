//! Payment gateway configuration.

use std::time::Duration;
use url::Url;

use super::Secret;

/// Credentials and settings for the payment gateway's Orders API.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Public key id, used as the basic-auth user.
    pub key_id: String,
    /// Key secret. Used for basic auth and as the HMAC key of payment
    /// signatures.
    pub key_secret: Secret,
    /// Base URL of the API, e.g. `https://api.razorpay.com/v1/`.
    pub api_base: Url,
    /// ISO currency code every order is created in.
    pub currency: String,
    pub timeout: Duration,
    /// Reject `/verify-payment` requests that carry no order token.
    pub require_order_token: bool,
}
