//! Press release API handlers.
//!
//! # Endpoints
//!
//! - `POST /upload_press_release`         – create (multipart)
//! - `GET  /get_data_press_releases`      – paginated listing, descriptions stripped
//! - `GET  /get_data_press_releases/{id}` – one press release
//! - `PUT  /update_press_release/{id}`    – partial update (multipart)

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use mrportal_core::entities::press_releases::{PressRelease, PressReleaseInsert};
use mrportal_core::html::strip_description;
use mrportal_sdk::objects::catalog::{
    ListQuery, PageResponse, PressReleaseForm, PressReleaseResponse, SortKey,
};
use mrportal_sdk::objects::{DataResponse, Validate};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::extractors::{MultipartForm, QueryParams, RecordId};
use crate::api::{UPLOAD_BODY_LIMIT, discard_upload, retire_upload, store_upload};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload_press_release", post(create_press_release))
        .route("/update_press_release/{id}", put(update_press_release))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .route("/get_data_press_releases", get(list_press_releases))
        .route("/get_data_press_releases/{id}", get(get_press_release))
}

fn press_release_form(form: &mut MultipartForm) -> PressReleaseForm {
    PressReleaseForm {
        title: form.text("title"),
        category: form.text("category"),
        description: form.text("description"),
        report_id: form.text("reportId"),
    }
}

fn listed(press_release: PressRelease) -> PressReleaseResponse {
    let mut response = PressReleaseResponse::from(press_release);
    response.description = Some(strip_description(response.description.as_deref()));
    response
}

/// `POST /upload_press_release`
async fn create_press_release(
    State(state): State<AppState>,
    mut form: MultipartForm,
) -> Result<impl IntoResponse, ApiError> {
    let fields = press_release_form(&mut form).validate()?;
    let file_path = store_upload(&state, form.file.take()).await?;
    let inserted = state
        .catalog
        .insert_press_release(PressReleaseInsert {
            id: Uuid::now_v7(),
            form: fields,
            file_path: file_path.clone(),
        })
        .await;
    let press_release = match inserted {
        Ok(press_release) => press_release,
        Err(e) => {
            discard_upload(&state, file_path.as_deref()).await;
            return Err(e.into());
        }
    };

    tracing::info!(id = %press_release.id, "Press release created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            message: "Press release created successfully".to_string(),
            data: PressReleaseResponse::from(press_release),
        }),
    ))
}

/// `PUT /update_press_release/{id}`: overwrite the supplied fields.
async fn update_press_release(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    mut form: MultipartForm,
) -> Result<impl IntoResponse, ApiError> {
    let fields = press_release_form(&mut form).validate()?;
    let mut press_release = state
        .catalog
        .get_press_release(id)
        .await?
        .ok_or(ApiError::NotFound("Press release not found"))?;

    let file_path = store_upload(&state, form.file.take()).await?;
    let previous_file = press_release.file_path.clone();
    press_release.apply_update(fields, file_path.clone());

    let updated = match state.catalog.update_press_release(press_release).await {
        Ok(Some(press_release)) => press_release,
        Ok(None) => {
            discard_upload(&state, file_path.as_deref()).await;
            return Err(ApiError::NotFound("Press release not found"));
        }
        Err(e) => {
            discard_upload(&state, file_path.as_deref()).await;
            return Err(e.into());
        }
    };

    retire_upload(&state, previous_file.as_deref(), file_path.as_deref()).await;

    tracing::info!(id = %updated.id, "Press release updated");
    Ok(Json(DataResponse {
        message: "Press release updated successfully".to_string(),
        data: PressReleaseResponse::from(updated),
    }))
}

/// `GET /get_data_press_releases`
async fn list_press_releases(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query.into_params(SortKey::UNPRICED)?;
    let page = state.catalog.list_press_releases(params).await?;
    Ok(Json(PageResponse {
        message: "Press releases fetched successfully".to_string(),
        data: page.items.into_iter().map(listed).collect(),
        total: page.total,
        page: params.page,
        limit: params.limit,
    }))
}

/// `GET /get_data_press_releases/{id}`
async fn get_press_release(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<impl IntoResponse, ApiError> {
    let press_release = state
        .catalog
        .get_press_release(id)
        .await?
        .ok_or(ApiError::NotFound("Press release not found"))?;
    Ok(Json(DataResponse {
        message: "Press release fetched successfully".to_string(),
        data: PressReleaseResponse::from(press_release),
    }))
}
