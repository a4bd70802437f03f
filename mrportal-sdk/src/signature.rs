//! Payment callback signature algorithm.
//!
//! After the customer pays, the gateway hands the checkout frontend three
//! values: the gateway order id, the payment id and a signature. The
//! signature is
//!
//! ```text
//! hex(HMAC-SHA256("{order_id}|{payment_id}", key_secret))
//! ```
//!
//! Verification recomputes the MAC and compares it in constant time through
//! [`ring::hmac::verify`]. Only the canonical lower-case 64 character hex
//! encoding is accepted.

use ring::hmac;

/// Length of a hex encoded HMAC-SHA256 digest.
pub const SIGNATURE_HEX_LEN: usize = 64;

/// Errors produced by signature operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("signature is not a lower-case hex encoded sha256 digest")]
    InvalidFormat,
    #[error("invalid signature")]
    SignatureMismatch,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// Build the message the gateway signs: `"{order_id}|{payment_id}"`.
pub fn payment_payload(order_id: &str, payment_id: &str) -> String {
    format!("{order_id}|{payment_id}")
}

/// Compute the hex encoded signature for a payment.
///
/// Mirrors what the gateway does; the server only needs it in tests and for
/// tooling that simulates checkout callbacks.
pub fn sign_payment(order_id: &str, payment_id: &str, key: &[u8]) -> String {
    let tag = hmac::sign(
        &hmac::Key::new(hmac::HMAC_SHA256, key),
        payment_payload(order_id, payment_id).as_bytes(),
    );
    hex::encode(tag.as_ref())
}

/// Verify a payment signature supplied by the checkout frontend.
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature_hex: &str,
    key: &[u8],
) -> Result<(), SignatureError> {
    let signature = decode_signature(signature_hex)?;
    hmac::verify(
        &hmac::Key::new(hmac::HMAC_SHA256, key),
        payment_payload(order_id, payment_id).as_bytes(),
        &signature,
    )?;
    Ok(())
}

fn decode_signature(signature_hex: &str) -> Result<Vec<u8>, SignatureError> {
    let canonical = signature_hex.len() == SIGNATURE_HEX_LEN
        && signature_hex
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if !canonical {
        return Err(SignatureError::InvalidFormat);
    }
    hex::decode(signature_hex).map_err(|_| SignatureError::InvalidFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"my_secret_key";

    #[test]
    fn test_known_vector() {
        // HMAC-SHA256("order_123|pay_456", "my_secret_key")
        let expected = hex::encode(
            hmac::sign(
                &hmac::Key::new(hmac::HMAC_SHA256, SECRET),
                b"order_123|pay_456",
            )
            .as_ref(),
        );
        assert_eq!(sign_payment("order_123", "pay_456", SECRET), expected);
        assert_eq!(expected.len(), SIGNATURE_HEX_LEN);
    }

    #[test]
    fn test_verify_accepts_matching_signature() {
        let sig = sign_payment("order_123", "pay_456", SECRET);
        assert_eq!(
            verify_payment_signature("order_123", "pay_456", &sig, SECRET),
            Ok(())
        );
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let sig = sign_payment("order_123", "pay_456", b"another_secret");
        assert_eq!(
            verify_payment_signature("order_123", "pay_456", &sig, SECRET),
            Err(SignatureError::SignatureMismatch)
        );
    }

    #[test]
    fn test_verify_rejects_swapped_identifiers() {
        let sig = sign_payment("order_123", "pay_456", SECRET);
        assert_eq!(
            verify_payment_signature("pay_456", "order_123", &sig, SECRET),
            Err(SignatureError::SignatureMismatch)
        );
    }

    #[test]
    fn test_verify_rejects_non_canonical_encoding() {
        let sig = sign_payment("order_123", "pay_456", SECRET);
        assert_eq!(
            verify_payment_signature("order_123", "pay_456", &sig.to_uppercase(), SECRET),
            Err(SignatureError::InvalidFormat)
        );
        assert_eq!(
            verify_payment_signature("order_123", "pay_456", "invalid_signature", SECRET),
            Err(SignatureError::InvalidFormat)
        );
        assert_eq!(
            verify_payment_signature("order_123", "pay_456", &sig[..62], SECRET),
            Err(SignatureError::InvalidFormat)
        );
    }
}
