//! Signed, time-limited tokens (JWT, HS256).
//!
//! Three kinds of token are issued by the server:
//!
//! * [`OrderClaims`]: handed out with a freshly created gateway order and
//!   presented back when the payment is verified (1 hour).
//! * [`ReportAccessClaims`]: stored on a licensed report (30 days).
//! * [`SessionClaims`]: bearer token returned by login/registration (1 hour).
//!
//! Every token carries a `typ` claim naming its kind so a token of one kind
//! is never accepted where another is expected.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::objects::catalog::LicenseType;

/// Lifetime of an order token, in seconds.
pub const ORDER_TOKEN_TTL: i64 = 60 * 60;
/// Lifetime of a report access token, in seconds.
pub const REPORT_ACCESS_TTL: i64 = 30 * 24 * 60 * 60;
/// Lifetime of a session token, in seconds.
pub const SESSION_TTL: i64 = 60 * 60;

/// A claim set that can be carried by a signed token.
pub trait Claims: Serialize + DeserializeOwned {
    /// Value of the `typ` claim.
    const KIND: &'static str;
    /// Lifetime in seconds.
    const TTL: i64;
}

/// Claims embedded in the token returned by `POST /create-order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderClaims {
    pub order_id: String,
    pub amount: u64,
    pub currency: String,
}

impl Claims for OrderClaims {
    const KIND: &'static str = "order";
    const TTL: i64 = ORDER_TOKEN_TTL;
}

/// Claims embedded in a report's access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportAccessClaims {
    pub report_id: String,
    pub license_type: LicenseType,
}

impl Claims for ReportAccessClaims {
    const KIND: &'static str = "report_access";
    const TTL: i64 = REPORT_ACCESS_TTL;
}

/// Claims of a login session; `sub` is the account email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
}

impl Claims for SessionClaims {
    const KIND: &'static str = "session";
    const TTL: i64 = SESSION_TTL;
}

/// Errors produced while issuing or verifying tokens.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token is of the wrong kind")]
    WrongKind,
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    #[error("failed to encode token: {0}")]
    Encode(jsonwebtoken::errors::Error),
}

#[derive(Serialize, Deserialize)]
struct Envelope<C> {
    typ: String,
    iat: i64,
    exp: i64,
    #[serde(flatten)]
    claims: C,
}

/// A token whose signature and expiry were checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken<C> {
    pub claims: C,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Issues and verifies HS256 tokens with one shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `claims`, valid for `C::TTL` seconds from now.
    pub fn issue<C: Claims>(&self, claims: C) -> Result<String, TokenError> {
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        self.issue_at(claims, now)
    }

    fn issue_at<C: Claims>(&self, claims: C, issued_at: i64) -> Result<String, TokenError> {
        let envelope = Envelope {
            typ: C::KIND.to_string(),
            iat: issued_at,
            exp: issued_at + C::TTL,
            claims,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &envelope, &self.encoding)
            .map_err(TokenError::Encode)
    }

    /// Verify signature, expiry and kind, returning the embedded claims.
    pub fn verify<C: Claims>(&self, token: &str) -> Result<VerifiedToken<C>, TokenError> {
        let data = jsonwebtoken::decode::<Envelope<C>>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })?;
        let envelope = data.claims;
        if envelope.typ != C::KIND {
            return Err(TokenError::WrongKind);
        }
        Ok(VerifiedToken {
            claims: envelope.claims,
            issued_at: envelope.iat,
            expires_at: envelope.exp,
        })
    }
}
