//! Payment API handlers.
//!
//! # Endpoints
//!
//! - `POST /create-order`                 – create a gateway order
//! - `POST /verify-payment`               – verify the checkout signature and record the payment
//! - `GET  /get-orders`                   – list gateway orders
//! - `GET  /get-order-details/{order_id}` – fetch one gateway order
//! - `GET  /license-access/{order_id}`    – license granted by a paid order

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use mrportal_core::entities::payments::PaymentInsert;
use mrportal_core::gateway::{OrderRequest, new_receipt};
use mrportal_sdk::objects::DataResponse;
use mrportal_sdk::objects::payment::{
    CreateOrderRequest, CreateOrderResponse, LicenseAccessResponse, OrderListQuery,
    PaymentVerification, VerifyPaymentRequest, VerifyPaymentResponse,
};
use mrportal_sdk::signature::verify_payment_signature;
use mrportal_sdk::token::OrderClaims;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::extractors::{QueryParams, ValidatedJson};
use crate::state::AppState;

/// Build the payment router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-order", post(create_order))
        .route("/verify-payment", post(verify_payment))
        .route("/get-orders", get(get_orders))
        .route("/get-order-details/{order_id}", get(get_order_details))
        .route("/license-access/{order_id}", get(get_license_access))
}

/// Gateway pass-through body: `{ "data": ... }`.
#[derive(Serialize)]
struct GatewayData<T> {
    data: T,
}

// ---------------------------------------------------------------------------
// POST /create-order
// ---------------------------------------------------------------------------

/// `POST /create-order`: create a gateway order for `amount` minor units.
///
/// Returns the gateway order and a signed order token binding its id,
/// amount and currency.
async fn create_order(
    State(state): State<AppState>,
    ValidatedJson(order): ValidatedJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = OrderRequest {
        amount: order.amount,
        currency: state.config.gateway.currency.clone(),
        receipt: new_receipt(),
    };

    let created = state
        .gateway
        .create_order(&request)
        .await
        .map_err(|e| ApiError::gateway(e, "Failed to create payment order"))?;

    let token = state.tokens.issue(OrderClaims {
        order_id: created.id.clone(),
        amount: created.amount,
        currency: created.currency.clone(),
    })?;

    Ok(Json(CreateOrderResponse {
        data: created,
        token,
    }))
}

// ---------------------------------------------------------------------------
// POST /verify-payment
// ---------------------------------------------------------------------------

/// `POST /verify-payment`: verify the checkout callback and record it.
///
/// Nothing is persisted unless the signature matches. A second
/// verification of the same order is rejected with 409.
async fn verify_payment(
    State(state): State<AppState>,
    ValidatedJson(verification): ValidatedJson<VerifyPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Err(e) = verify_payment_signature(
        &verification.order_id,
        &verification.payment_id,
        &verification.signature,
        state.config.gateway.key_secret.as_bytes(),
    ) {
        tracing::warn!(
            order_id = %verification.order_id,
            error = %e,
            "Payment signature rejected"
        );
        return Err(ApiError::BadRequest("Invalid payment signature"));
    }

    check_order_token(&state, &verification)?;

    if let Some(existing) = state.payments.find_payment(&verification.order_id).await? {
        tracing::warn!(
            order_id = %existing.order_id,
            payment_id = %existing.payment_id,
            "Payment already recorded"
        );
        return Err(ApiError::Conflict("Payment already verified for this order"));
    }

    let amount = i64::try_from(verification.amount)
        .map_err(|_| ApiError::invalid_field("amount", "is too large"))?;
    let PaymentVerification {
        order_id,
        payment_id,
        signature,
        currency,
        license_type,
        ..
    } = verification;

    let recorded = state
        .payments
        .record_verified_payment(
            PaymentInsert {
                id: Uuid::now_v7(),
                order_id: order_id.clone(),
                payment_id,
                signature,
                amount,
                currency,
            },
            license_type.map(Into::into),
        )
        .await?
        .ok_or_else(|| {
            tracing::warn!(order_id = %order_id, "Payment recorded concurrently");
            ApiError::Conflict("Payment already verified for this order")
        })?;

    tracing::info!(
        order_id = %recorded.payment.order_id,
        payment_id = %recorded.payment.payment_id,
        licensed = recorded.license.is_some(),
        "Payment verified"
    );

    Ok(Json(VerifyPaymentResponse {
        message: "Payment successfully verified and saved".to_string(),
        payment: recorded.payment.into(),
        license: recorded.license.map(Into::into),
    }))
}

/// The order token, when present or required, must name this exact order.
fn check_order_token(state: &AppState, verification: &PaymentVerification) -> Result<(), ApiError> {
    let Some(token) = &verification.order_token else {
        if state.config.gateway.require_order_token {
            return Err(ApiError::BadRequest("Order token is required"));
        }
        return Ok(());
    };

    let claims = state
        .tokens
        .verify::<OrderClaims>(token)
        .map_err(|e| {
            tracing::warn!(error = %e, "Order token rejected");
            ApiError::BadRequest("Invalid or expired order token")
        })?
        .claims;

    let matches = claims.order_id == verification.order_id
        && claims.amount == verification.amount
        && claims.currency.eq_ignore_ascii_case(&verification.currency);
    if matches {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Order token does not match this payment"))
    }
}

// ---------------------------------------------------------------------------
// Gateway pass-through
// ---------------------------------------------------------------------------

/// `GET /get-orders`: list orders known to the gateway.
async fn get_orders(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<OrderListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .gateway
        .list_orders(&query)
        .await
        .map_err(|e| ApiError::gateway(e, "Failed to fetch orders"))?;
    Ok(Json(GatewayData { data: orders }))
}

/// `GET /get-order-details/{order_id}`: fetch one gateway order.
async fn get_order_details(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .gateway
        .fetch_order(&order_id)
        .await
        .map_err(|e| ApiError::gateway(e, "Failed to fetch order details"))?;
    Ok(Json(GatewayData { data: order }))
}

/// `GET /license-access/{order_id}`: the license granted by a paid order.
async fn get_license_access(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let access = state
        .payments
        .find_license_access(&order_id)
        .await?
        .ok_or(ApiError::NotFound("No license found for this order"))?;
    Ok(Json(DataResponse::<LicenseAccessResponse> {
        message: "License access fetched successfully".to_string(),
        data: access.into(),
    }))
}
