//! Error type shared by every handler.
//!
//! Every failure is rendered as [`ErrorResponse`]. 5xx causes are logged,
//! never returned.

use crate::uploads::UploadError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mrportal_core::gateway::GatewayError;
use mrportal_core::store::StoreError;
use mrportal_sdk::objects::{ErrorResponse, ValidationErrors};
use mrportal_sdk::token::TokenError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed request fields.
    #[error("{}", .0.message())]
    Validation(ValidationErrors),

    /// Well-formed request rejected by a check (signature, order token).
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    /// An upstream service failed; the cause was logged.
    #[error("{0}")]
    Upstream(&'static str),

    #[error("{0}")]
    UpstreamTimeout(&'static str),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl ApiError {
    /// Map a gateway failure; `failure` is the message returned to callers.
    pub fn gateway(e: GatewayError, failure: &'static str) -> Self {
        match e {
            GatewayError::Timeout => {
                tracing::warn!("Payment gateway timed out");
                ApiError::UpstreamTimeout("Payment gateway timed out")
            }
            e if e.is_not_found() => ApiError::NotFound("Order not found"),
            e if e.is_rejection() => {
                tracing::warn!(error = %e, "Payment gateway rejected the request");
                ApiError::BadRequest("Payment gateway rejected the request")
            }
            e => {
                tracing::error!(error = %e, "{failure}");
                ApiError::Upstream(failure)
            }
        }
    }

    /// A single-field validation failure.
    pub fn invalid_field(field: &str, message: &str) -> Self {
        let mut errors = ValidationErrors::default();
        errors.add(field, message);
        ApiError::Validation(errors)
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::Store(StoreError::Conflict(_)) => {
                StatusCode::CONFLICT
            }
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Store(StoreError::Database(_))
            | ApiError::Upload(_)
            | ApiError::Token(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(errors) => ErrorResponse {
                message: errors.message().to_string(),
                fields: errors.fields().to_vec(),
            },
            e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = %e, "Request failed");
                ErrorResponse {
                    message: "Internal server error".to_string(),
                    fields: Vec::new(),
                }
            }
            e => ErrorResponse {
                message: e.to_string(),
                fields: Vec::new(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(ValidationErrors::default()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Store(StoreError::Conflict("report")).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::gateway(GatewayError::Timeout, "x").status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::gateway(
                GatewayError::Api {
                    status: 404,
                    body: String::new()
                },
                "x"
            )
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::gateway(
                GatewayError::Api {
                    status: 500,
                    body: String::new()
                },
                "Failed to fetch orders"
            )
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::gateway(
                GatewayError::Api {
                    status: 400,
                    body: "Order amount less than minimum amount allowed".into()
                },
                "Failed to create order"
            )
            .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_details_are_not_returned() {
        let response = ApiError::Internal("pool exhausted".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
