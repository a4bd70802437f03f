//! Account API handlers.
//!
//! # Endpoints
//!
//! - `POST /register_new_user` – create an account and start a session
//! - `POST /login`             – exchange credentials for a session token
//! - `GET  /me`                – profile of the bearer

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use mrportal_core::entities::accounts::AccountInsert;
use mrportal_sdk::objects::account::{AuthResponse, LoginRequest, ProfileResponse, RegisterRequest};
use mrportal_sdk::token::SessionClaims;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::extractors::{BearerAuth, ValidatedJson};
use crate::state::AppState;

/// Build the account router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register_new_user", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

/// Verified in place of a stored hash when the email is unknown, so both
/// failure paths cost one argon2 run. Parameters match `Argon2::default()`.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$bXJwb3J0YWwtZHVtbXkxNg$\
                          UlIUZ6wmMHTUC3bcZyid0Cth65pmkjf3nGWAaWniQFc";

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("stored password hash is invalid: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Run argon2 off the async workers.
async fn blocking<T: Send + 'static>(
    f: impl FnOnce() -> Result<T, ApiError> + Send + 'static,
) -> Result<T, ApiError> {
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("password task failed: {e}")))?
}

fn session(state: &AppState, email: String, message: &str) -> Result<AuthResponse, ApiError> {
    let token = state.tokens.issue(SessionClaims { sub: email })?;
    let expires_at = state.tokens.verify::<SessionClaims>(&token)?.expires_at;
    Ok(AuthResponse {
        message: message.to_string(),
        token,
        expires_at,
    })
}

/// `POST /register_new_user`: create an account.
///
/// Emails are unique (case-insensitively); a taken email is a 409.
async fn register(
    State(state): State<AppState>,
    ValidatedJson(registration): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password = registration.password;
    let password_hash = blocking(move || hash_password(&password)).await?;

    let account = state
        .accounts
        .create_account(AccountInsert {
            id: Uuid::now_v7(),
            email: registration.email,
            password_hash,
            full_name: registration.full_name,
            company_name: registration.company_name,
            phone: registration.phone,
        })
        .await?
        .ok_or(ApiError::Conflict("Email is already registered"))?;

    tracing::info!(account_id = %account.id, "Account registered");
    let response = session(&state, account.email, "Registration successful")?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `POST /login`: verify credentials and issue a session token.
async fn login(
    State(state): State<AppState>,
    ValidatedJson(credentials): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state
        .accounts
        .find_account_by_email(&credentials.email)
        .await?;

    let password = credentials.password;
    let hash = account
        .as_ref()
        .map_or_else(|| DUMMY_HASH.to_string(), |a| a.password_hash.clone());
    let verified = blocking(move || verify_password(&password, &hash)).await?;

    match account {
        Some(account) if verified => {
            Ok(Json(session(&state, account.email, "Login successful")?))
        }
        _ => Err(ApiError::Unauthorized("Invalid credentials")),
    }
}

/// `GET /me`: profile of the authenticated account.
async fn me(
    State(state): State<AppState>,
    BearerAuth(session): BearerAuth,
) -> Result<impl IntoResponse, ApiError> {
    let account = state
        .accounts
        .find_account_by_email(&session.claims.sub)
        .await?
        .ok_or(ApiError::NotFound("Account not found"))?;
    Ok(Json(ProfileResponse::from(account)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_dummy_hash_costs_a_real_verification() {
        let parsed = PasswordHash::new(DUMMY_HASH).unwrap();
        let params = argon2::Params::try_from(&parsed).unwrap();
        let defaults = argon2::Params::default();
        assert_eq!(params.m_cost(), defaults.m_cost());
        assert_eq!(params.t_cost(), defaults.t_cost());
        assert_eq!(params.p_cost(), defaults.p_cost());
        assert!(!verify_password("correct horse", DUMMY_HASH).unwrap());
    }
}
