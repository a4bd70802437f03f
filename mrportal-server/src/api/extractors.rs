//! Custom Axum extractors.
//!
//! Provides:
//! - `ValidatedJson<T>`: parses a JSON body into `T` and runs [`Validate`]
//! - `QueryParams<T>` and `RecordId`: query and path extractors whose
//!   rejections use the API error body
//! - `MultipartForm`: collects text fields and at most one `file` field
//! - `BearerAuth`: verifies an `Authorization: Bearer` session token

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Multipart, Path, Query, Request},
    http::{header::AUTHORIZATION, request::Parts},
};
use bytes::Bytes;
use mrportal_sdk::objects::{Validate, ValidationErrors};
use mrportal_sdk::token::{SessionClaims, VerifiedToken};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::state::AppState;

/// Name of the multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

// ---------------------------------------------------------------------------
// ValidatedJson
// ---------------------------------------------------------------------------

/// A JSON body of type `T`, already validated.
///
/// Unknown fields are rejected by the request types themselves
/// (`deny_unknown_fields`).
pub struct ValidatedJson<T: Validate>(pub T::Valid);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: Validate + DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(raw) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ValidationErrors::malformed(rejection.body_text()))?;
        Ok(ValidatedJson(raw.validate()?))
    }
}

// ---------------------------------------------------------------------------
// QueryParams / RecordId
// ---------------------------------------------------------------------------

/// Query string deserialized into `T`.
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                let mut errors = ValidationErrors::new("Invalid query string");
                errors.add("query", rejection.body_text());
                errors
            })?;
        Ok(QueryParams(query))
    }
}

/// The `{id}` path segment of a catalog record.
pub struct RecordId(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for RecordId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ValidationErrors::malformed(rejection.body_text()))?;
        Uuid::parse_str(&raw)
            .map(RecordId)
            .map_err(|_| ApiError::invalid_field("id", "is not a valid identifier"))
    }
}

// ---------------------------------------------------------------------------
// MultipartForm
// ---------------------------------------------------------------------------

/// A file received in a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub contents: Bytes,
}

/// A multipart body split into text fields and an optional file.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, Vec<String>>,
    pub file: Option<UploadedFile>,
}

impl MultipartForm {
    /// Take the first value of a text field.
    pub fn text(&mut self, name: &str) -> Option<String> {
        self.fields
            .remove(name)
            .and_then(|values| values.into_iter().next())
    }

    /// Take every value of a repeated field. Each value may also hold a
    /// comma separated list.
    pub fn list(&mut self, name: &str) -> Option<Vec<String>> {
        let values = self.fields.remove(name)?;
        Some(
            values
                .iter()
                .flat_map(|v| v.split(','))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    #[cfg(test)]
    pub fn with_fields(fields: &[(&str, &str)]) -> Self {
        let mut form = Self::default();
        for (name, value) in fields {
            form.fields
                .entry(name.to_string())
                .or_default()
                .push(value.to_string());
        }
        form
    }
}

impl<S: Send + Sync> FromRequest<S> for MultipartForm {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| ValidationErrors::malformed(rejection.body_text()))?;

        let mut form = MultipartForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ValidationErrors::malformed(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name == FILE_FIELD {
                if form.file.is_some() {
                    return Err(ApiError::invalid_field(
                        FILE_FIELD,
                        "only one file may be uploaded",
                    ));
                }
                let file_name = field.file_name().map(str::to_string);
                let contents = field
                    .bytes()
                    .await
                    .map_err(|e| ValidationErrors::malformed(e.body_text()))?;
                form.file = Some(UploadedFile {
                    file_name,
                    contents,
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ValidationErrors::malformed(e.body_text()))?;
                form.fields.entry(name).or_default().push(value);
            }
        }
        Ok(form)
    }
}

// ---------------------------------------------------------------------------
// BearerAuth
// ---------------------------------------------------------------------------

/// A verified session token from the `Authorization` header.
pub struct BearerAuth(pub VerifiedToken<SessionClaims>);

impl FromRequestParts<AppState> for BearerAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::Unauthorized("Missing bearer token"))?;

        state
            .tokens
            .verify::<SessionClaims>(token)
            .map(BearerAuth)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected session token");
                ApiError::Unauthorized("Invalid or expired token")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_splits_and_trims() {
        let mut form = MultipartForm::with_fields(&[
            ("allowedEmails", "a@x.com, b@x.com"),
            ("allowedEmails", "c@x.com"),
            ("allowedEmails", " , "),
        ]);
        assert_eq!(
            form.list("allowedEmails").unwrap(),
            vec!["a@x.com", "b@x.com", "c@x.com"]
        );
        assert_eq!(form.list("allowedEmails"), None);
    }

    #[test]
    fn test_text_takes_first_value() {
        let mut form = MultipartForm::with_fields(&[("title", "One"), ("title", "Two")]);
        assert_eq!(form.text("title").as_deref(), Some("One"));
        assert_eq!(form.text("title"), None);
    }
}
