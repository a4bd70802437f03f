//! Report API handlers.
//!
//! # Endpoints
//!
//! - `POST /reports`               – upload a licensed report (multipart)
//! - `GET  /get_reports`           – paginated listing, descriptions stripped
//! - `GET  /get_report/{id}`       – one report
//! - `GET  /reports/{id}`          – one report
//! - `PUT  /reports_update/{id}`   – partial update (multipart)
//! - `POST /reports/verify-access` – check an access token against the license

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use mrportal_core::entities::reports::{Report, ReportInsert, generate_report_id};
use mrportal_core::html::strip_description;
use mrportal_sdk::objects::catalog::{
    LicenseType, ListQuery, PageResponse, ReportAccessResponse, ReportForm, ReportResponse,
    SortKey, VerifyReportAccessRequest,
};
use mrportal_sdk::objects::{DataResponse, Validate};
use mrportal_sdk::token::ReportAccessClaims;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::extractors::{MultipartForm, QueryParams, RecordId, ValidatedJson};
use crate::api::{UPLOAD_BODY_LIMIT, discard_upload, retire_upload, store_upload};
use crate::state::AppState;

/// Build the report router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports", post(create_report))
        .route("/reports_update/{id}", put(update_report))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .route("/get_reports", get(list_reports))
        .route("/get_report/{id}", get(get_report))
        .route("/reports/{id}", get(get_report))
        .route("/reports/verify-access", post(verify_access))
}

/// Read the report fields of a multipart form.
fn report_form(form: &mut MultipartForm) -> ReportForm {
    ReportForm {
        title: form.text("title"),
        category: form.text("category"),
        single_user_price: form.text("singleUserPrice"),
        multi_user_price: form.text("multiUserPrice"),
        enterprise_price: form.text("enterprisePrice"),
        summary: form.text("summary"),
        table_of_contents: form.text("tableOfContents"),
        methodology: form.text("methodology"),
        description: form.text("description"),
        download_sample_report: form.text("downloadSampleReport"),
        report_id: form.text("reportId"),
        license_type: form.text("licenseType"),
        allowed_emails: form.list("allowedEmails"),
        current_user_email: form.text("currentUserEmail"),
    }
}

fn access_token(
    state: &AppState,
    report_id: &str,
    license_type: LicenseType,
) -> Result<String, ApiError> {
    Ok(state.tokens.issue(ReportAccessClaims {
        report_id: report_id.to_string(),
        license_type,
    })?)
}

/// Listing shape: description tag-stripped, `""` when absent.
fn listed(report: Report) -> ReportResponse {
    let mut response = ReportResponse::from(report);
    response.description = Some(strip_description(response.description.as_deref()));
    response
}

// ---------------------------------------------------------------------------
// POST /reports
// ---------------------------------------------------------------------------

/// `POST /reports`: create a report and issue its access token.
async fn create_report(
    State(state): State<AppState>,
    mut form: MultipartForm,
) -> Result<impl IntoResponse, ApiError> {
    let draft = report_form(&mut form).validate()?;
    let report_id = draft.report_id.clone().unwrap_or_else(generate_report_id);
    let access_token = access_token(&state, &report_id, draft.license.license_type())?;

    let file_path = store_upload(&state, form.file.take()).await?;
    let inserted = state
        .catalog
        .insert_report(ReportInsert {
            id: Uuid::now_v7(),
            report_id,
            draft,
            file_path: file_path.clone(),
            access_token,
        })
        .await;
    let report = match inserted {
        Ok(report) => report,
        Err(e) => {
            discard_upload(&state, file_path.as_deref()).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        id = %report.id,
        report_id = %report.report_id,
        license_type = ?report.license_type,
        "Report created"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            message: "Report created successfully!".to_string(),
            data: ReportResponse::from(report),
        }),
    ))
}

// ---------------------------------------------------------------------------
// PUT /reports_update/{id}
// ---------------------------------------------------------------------------

/// `PUT /reports_update/{id}`: patch a report.
///
/// License rules apply to the merged result. The access token is reissued
/// when the license type or the report id changes.
async fn update_report(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    mut form: MultipartForm,
) -> Result<impl IntoResponse, ApiError> {
    let patch = report_form(&mut form).into_patch()?;
    let mut report = state
        .catalog
        .get_report(id)
        .await?
        .ok_or(ApiError::NotFound("Report not found"))?;

    let current = report.license_terms();
    let license = if patch.touches_license() {
        patch.merge_license(&current)?
    } else {
        current.clone()
    };
    let reissue = license.license_type() != current.license_type()
        || patch
            .report_id
            .as_ref()
            .is_some_and(|new_id| *new_id != report.report_id);

    report.apply_patch(patch, &license);
    if reissue {
        report.access_token = access_token(&state, &report.report_id, license.license_type())?;
    }

    let file_path = store_upload(&state, form.file.take()).await?;
    let previous_file = report.file_path.clone();
    if file_path.is_some() {
        report.file_path = file_path.clone();
    }

    let updated = match state.catalog.update_report(report).await {
        Ok(Some(report)) => report,
        Ok(None) => {
            discard_upload(&state, file_path.as_deref()).await;
            return Err(ApiError::NotFound("Report not found"));
        }
        Err(e) => {
            discard_upload(&state, file_path.as_deref()).await;
            return Err(e.into());
        }
    };

    retire_upload(&state, previous_file.as_deref(), file_path.as_deref()).await;

    tracing::info!(id = %updated.id, reissued_token = reissue, "Report updated");
    Ok(Json(DataResponse {
        message: "Report updated successfully".to_string(),
        data: ReportResponse::from(updated),
    }))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// `GET /get_reports`: one page of reports.
async fn list_reports(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query.into_params(SortKey::PRICED)?;
    let page = state.catalog.list_reports(params).await?;
    Ok(Json(PageResponse {
        message: "Reports fetched successfully".to_string(),
        data: page.items.into_iter().map(listed).collect(),
        total: page.total,
        page: params.page,
        limit: params.limit,
    }))
}

/// `GET /get_report/{id}` and `GET /reports/{id}`: one report, unmodified.
async fn get_report(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .catalog
        .get_report(id)
        .await?
        .ok_or(ApiError::NotFound("Report not found"))?;
    Ok(Json(DataResponse {
        message: "Report fetched successfully".to_string(),
        data: ReportResponse::from(report),
    }))
}

// ---------------------------------------------------------------------------
// POST /reports/verify-access
// ---------------------------------------------------------------------------

/// `POST /reports/verify-access`: check a report access token.
///
/// The token must be the one currently stored on the report, and the
/// report's license must grant `email`.
async fn verify_access(
    State(state): State<AppState>,
    ValidatedJson(check): ValidatedJson<VerifyReportAccessRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let verified = state
        .tokens
        .verify::<ReportAccessClaims>(&check.token)
        .map_err(|e| {
            tracing::debug!(error = %e, "Report access token rejected");
            ApiError::Unauthorized("Invalid or expired access token")
        })?;

    let report = state
        .catalog
        .find_report_by_report_id(&verified.claims.report_id)
        .await?
        .ok_or(ApiError::NotFound("Report not found"))?;
    if report.access_token != check.token {
        return Err(ApiError::Unauthorized("Access token has been superseded"));
    }

    let license = report.license_terms();
    if !license.grants(check.email.as_deref()) {
        return Err(ApiError::Forbidden("Access to this report is not granted"));
    }

    Ok(Json(ReportAccessResponse {
        message: "Access granted".to_string(),
        report_id: report.report_id,
        license_type: license.license_type(),
        expires_at: verified.expires_at,
    }))
}
