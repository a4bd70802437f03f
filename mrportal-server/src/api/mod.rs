//! HTTP API.
//!
//! Each submodule exposes a `router()`; [`router`] merges them.

pub mod accounts;
pub mod error;
pub mod extractors;
pub mod forms;
pub mod infographics;
pub mod payments;
pub mod press_releases;
pub mod reports;


use crate::api::error::ApiError;
use crate::api::extractors::UploadedFile;
use crate::state::AppState;
use axum::Router;

/// Largest request body accepted by the upload routes.
pub const UPLOAD_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(payments::router())
        .merge(accounts::router())
        .merge(forms::router())
        .merge(reports::router())
        .merge(infographics::router())
        .merge(press_releases::router())
}

/// Store an uploaded file, returning its public path.
async fn store_upload(
    state: &AppState,
    file: Option<UploadedFile>,
) -> Result<Option<String>, ApiError> {
    match file {
        Some(file) => Ok(Some(
            state
                .uploads
                .save(file.file_name.as_deref(), file.contents)
                .await?,
        )),
        None => Ok(None),
    }
}

/// Remove the file a record pointed at before `replacement` was stored.
async fn retire_upload(state: &AppState, previous: Option<&str>, replacement: Option<&str>) {
    if replacement.is_some() && previous != replacement {
        discard_upload(state, previous).await;
    }
}

/// Remove an upload whose record could not be written.
async fn discard_upload(state: &AppState, file_path: Option<&str>) {
    if let Some(path) = file_path {
        state.uploads.discard(path).await;
    }
}
