//! Payment gateway (Orders API) seam.

mod razorpay;

pub use razorpay::RazorpayClient;

use async_trait::async_trait;
use mrportal_sdk::objects::payment::{GatewayOrder, GatewayOrderList, OrderListQuery};
use rand::Rng;
use thiserror::Error;

/// Number of random bytes in an order receipt (hex encoded to 20 chars).
const RECEIPT_BYTES: usize = 10;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway did not answer within the configured timeout.
    #[error("payment gateway timed out")]
    Timeout,

    /// The gateway answered with a non-success status.
    #[error("payment gateway returned {status}: {body}")]
    Api { status: u16, body: String },

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(reqwest::Error),

    #[error("unexpected gateway response: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Http(e)
        }
    }
}

impl GatewayError {
    /// Whether the gateway reported the requested entity as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::Api { status: 404, .. })
    }

    /// Whether the gateway rejected the request itself (4xx), as opposed to failing.
    pub fn is_rejection(&self) -> bool {
        matches!(self, GatewayError::Api { status: 400..=499, .. })
    }
}

/// Parameters of a new gateway order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OrderRequest {
    /// Minor currency units.
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
}

/// Random order receipt: 20 lower-case hex characters.
pub fn new_receipt() -> String {
    let mut bytes = [0u8; RECEIPT_BYTES];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, GatewayError>;
    async fn list_orders(&self, query: &OrderListQuery) -> Result<GatewayOrderList, GatewayError>;
    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_is_twenty_hex_chars() {
        let a = new_receipt();
        let b = new_receipt();
        assert_eq!(a.len(), 20);
        assert!(a.bytes().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
