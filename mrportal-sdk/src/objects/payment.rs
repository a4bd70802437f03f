//! Payment order objects.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::catalog::LicenseType;
use super::{Validate, ValidationErrors, non_blank};

// ---------------------------------------------------------------------------
// Gateway objects
// ---------------------------------------------------------------------------

/// An order as returned by the payment gateway's Orders API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    #[serde(default = "default_order_entity")]
    pub entity: String,
    /// Amount in the smallest currency unit (paise for INR).
    pub amount: u64,
    #[serde(default)]
    pub amount_paid: u64,
    #[serde(default)]
    pub amount_due: u64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub offer_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub notes: serde_json::Value,
    pub created_at: i64,
}

fn default_order_entity() -> String {
    "order".to_string()
}

/// A page of orders from the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrderList {
    #[serde(default)]
    pub entity: String,
    pub count: u32,
    pub items: Vec<GatewayOrder>,
}

/// Query of `GET /get-orders`; `from`/`to` are unix timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderListQuery {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub count: Option<u32>,
}

/// Number of orders fetched when the caller does not say.
pub const DEFAULT_ORDER_COUNT: u32 = 10;
/// Upper bound the gateway accepts for `count`.
pub const MAX_ORDER_COUNT: u32 = 100;

impl OrderListQuery {
    pub fn count_or_default(&self) -> u32 {
        self.count
            .unwrap_or(DEFAULT_ORDER_COUNT)
            .clamp(1, MAX_ORDER_COUNT)
    }
}

// ---------------------------------------------------------------------------
// POST /create-order
// ---------------------------------------------------------------------------

/// Body of `POST /create-order`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderRequest {
    /// Amount in the smallest currency unit.
    pub amount: Option<u64>,
}

/// A checked order creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrder {
    pub amount: u64,
}

impl Validate for CreateOrderRequest {
    type Valid = NewOrder;

    fn validate(self) -> Result<NewOrder, ValidationErrors> {
        match self.amount {
            Some(amount) if amount > 0 => Ok(NewOrder { amount }),
            _ => {
                let mut errors = ValidationErrors::new("Amount is required");
                errors.add("amount", "must be a positive integer amount in minor units");
                Err(errors)
            }
        }
    }
}

/// Response of `POST /create-order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub data: GatewayOrder,
    /// Signed order token to present to `POST /verify-payment`.
    pub token: String,
}

// ---------------------------------------------------------------------------
// POST /verify-payment
// ---------------------------------------------------------------------------

/// Body of `POST /verify-payment`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub amount: Option<u64>,
    pub currency: Option<String>,
    /// Token returned by `POST /create-order`.
    pub order_token: Option<String>,
    /// License purchased with this payment, if any.
    pub license_type: Option<LicenseType>,
}

/// A verification request with every required field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentVerification {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub amount: u64,
    pub currency: String,
    pub order_token: Option<String>,
    pub license_type: Option<LicenseType>,
}

impl Validate for VerifyPaymentRequest {
    type Valid = PaymentVerification;

    fn validate(self) -> Result<PaymentVerification, ValidationErrors> {
        let mut errors = ValidationErrors::new("All fields are required");
        let order_id = errors.require_text("razorpay_order_id", self.razorpay_order_id);
        let payment_id = errors.require_text("razorpay_payment_id", self.razorpay_payment_id);
        let signature = errors.require_text("razorpay_signature", self.razorpay_signature);
        let amount = errors.require("amount", self.amount.filter(|a| *a > 0));
        let currency = errors.require_text("currency", self.currency);

        match (order_id, payment_id, signature, amount, currency) {
            (Some(order_id), Some(payment_id), Some(signature), Some(amount), Some(currency))
                if errors.is_empty() =>
            {
                Ok(PaymentVerification {
                    order_id,
                    payment_id,
                    signature,
                    amount,
                    currency: currency.to_ascii_uppercase(),
                    order_token: non_blank(self.order_token),
                    license_type: self.license_type,
                })
            }
            _ => Err(errors),
        }
    }
}

/// A persisted, verified payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub order_id: String,
    pub payment_id: String,
    pub amount: u64,
    pub currency: String,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A license grant tied to a paid order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseAccessResponse {
    pub order_id: String,
    pub license_type: LicenseType,
    pub access_granted: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Response of `POST /verify-payment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentResponse {
    pub message: String,
    pub payment: PaymentResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<LicenseAccessResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_amount_is_rejected() {
        let err = CreateOrderRequest { amount: None }.validate().unwrap_err();
        assert_eq!(err.message(), "Amount is required");
        let err = CreateOrderRequest { amount: Some(0) }.validate().unwrap_err();
        assert_eq!(err.fields()[0].field, "amount");
        assert_eq!(
            CreateOrderRequest {
                amount: Some(50_000)
            }
            .validate()
            .unwrap(),
            NewOrder { amount: 50_000 }
        );
    }

    #[test]
    fn test_verify_request_lists_every_missing_field() {
        let request: VerifyPaymentRequest =
            serde_json::from_str(r#"{"razorpay_order_id":"order_1","currency":"inr"}"#).unwrap();
        let err = request.validate().unwrap_err();
        let fields: Vec<_> = err.fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["razorpay_payment_id", "razorpay_signature", "amount"]
        );
        assert_eq!(err.message(), "All fields are required");
    }

    #[test]
    fn test_verify_request_normalises_currency() {
        let request = VerifyPaymentRequest {
            razorpay_order_id: Some("order_1".into()),
            razorpay_payment_id: Some("pay_1".into()),
            razorpay_signature: Some("ab".into()),
            amount: Some(100),
            currency: Some("inr".into()),
            order_token: Some("  ".into()),
            license_type: Some(LicenseType::Single),
        };
        let valid = request.validate().unwrap();
        assert_eq!(valid.currency, "INR");
        assert_eq!(valid.order_token, None);
        assert_eq!(valid.license_type, Some(LicenseType::Single));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let parsed = serde_json::from_str::<CreateOrderRequest>(r#"{"amount":1,"coupon":"X"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_gateway_order_parses_gateway_payload() {
        let order: GatewayOrder = serde_json::from_str(
            r#"{
                "id": "order_IluGWxBm9U8zJ8",
                "entity": "order",
                "amount": 50000,
                "amount_paid": 0,
                "amount_due": 50000,
                "currency": "INR",
                "receipt": "0a1b2c3d4e5f60718293",
                "offer_id": null,
                "status": "created",
                "attempts": 0,
                "notes": [],
                "created_at": 1642662092
            }"#,
        )
        .unwrap();
        assert_eq!(order.amount, 50_000);
        assert_eq!(order.receipt.as_deref(), Some("0a1b2c3d4e5f60718293"));
    }

    #[test]
    fn test_order_count_defaults_and_clamps() {
        assert_eq!(OrderListQuery::default().count_or_default(), 10);
        let query = OrderListQuery {
            count: Some(1000),
            ..Default::default()
        };
        assert_eq!(query.count_or_default(), MAX_ORDER_COUNT);
    }
}
