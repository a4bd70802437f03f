//! Infographic API handlers.
//!
//! # Endpoints
//!
//! - `POST /infographics`            – upload an infographic (multipart)
//! - `GET  /get_infographics`        – paginated listing
//! - `GET  /get_infographics/{id}`   – one infographic
//! - `GET  /get_infographic/{id}`    – one infographic
//!
//! Every read returns the description with its markup stripped.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use mrportal_core::entities::infographics::{Infographic, InfographicInsert};
use mrportal_core::html::strip_description;
use mrportal_sdk::objects::catalog::{
    InfographicForm, InfographicResponse, ListQuery, PageResponse, SortKey,
};
use mrportal_sdk::objects::{DataResponse, Validate};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::extractors::{MultipartForm, QueryParams, RecordId};
use crate::api::{UPLOAD_BODY_LIMIT, discard_upload, store_upload};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/infographics", post(create_infographic))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .route("/get_infographics", get(list_infographics))
        .route("/get_infographics/{id}", get(get_infographic))
        .route("/get_infographic/{id}", get(get_infographic))
}

fn infographic_form(form: &mut MultipartForm) -> InfographicForm {
    InfographicForm {
        title: form.text("title"),
        category: form.text("category"),
        single_user_price: form.text("singleUserPrice"),
        multi_user_price: form.text("multiUserPrice"),
        enterprise_price: form.text("enterprisePrice"),
        summary: form.text("summary"),
        table_of_contents: form.text("tableOfContents"),
        methodology: form.text("methodology"),
        infographics: form.text("infographics"),
        description: form.text("description"),
        image_url: form.text("imageUrl"),
        report_id: form.text("reportId"),
    }
}

fn stripped(infographic: Infographic) -> InfographicResponse {
    let mut response = InfographicResponse::from(infographic);
    response.description = Some(strip_description(response.description.as_deref()));
    response
}

/// `POST /infographics`
async fn create_infographic(
    State(state): State<AppState>,
    mut form: MultipartForm,
) -> Result<impl IntoResponse, ApiError> {
    let draft = infographic_form(&mut form).validate()?;
    let file_path = store_upload(&state, form.file.take()).await?;
    let inserted = state
        .catalog
        .insert_infographic(InfographicInsert {
            id: Uuid::now_v7(),
            draft,
            file_path: file_path.clone(),
        })
        .await;
    let infographic = match inserted {
        Ok(infographic) => infographic,
        Err(e) => {
            discard_upload(&state, file_path.as_deref()).await;
            return Err(e.into());
        }
    };

    tracing::info!(id = %infographic.id, "Infographic created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            message: "Infographic created successfully!".to_string(),
            data: InfographicResponse::from(infographic),
        }),
    ))
}

/// `GET /get_infographics`
async fn list_infographics(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query.into_params(SortKey::PRICED)?;
    let page = state.catalog.list_infographics(params).await?;
    Ok(Json(PageResponse {
        message: "Infographics fetched successfully".to_string(),
        data: page.items.into_iter().map(stripped).collect(),
        total: page.total,
        page: params.page,
        limit: params.limit,
    }))
}

/// `GET /get_infographics/{id}` and `GET /get_infographic/{id}`
async fn get_infographic(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<impl IntoResponse, ApiError> {
    let infographic = state
        .catalog
        .get_infographic(id)
        .await?
        .ok_or(ApiError::NotFound("Infographic not found"))?;
    Ok(Json(DataResponse {
        message: "Infographic fetched successfully".to_string(),
        data: stripped(infographic),
    }))
}
