//! Lead-capture handlers.
//!
//! Every submission is stored together with its outbox notification, then
//! one delivery attempt is made inline. A failed attempt does not fail the
//! request; the notification stays pending for the retrier.
//!
//! # Endpoints
//!
//! - `POST /send-email`                   – sample report request
//! - `POST /marketing/contact_page_data`  – contact page message
//! - `GET  /marketing/contact_page_data`  – list contact page messages
//! - `POST /marketing/contact_form`       – full contact form
//! - `GET  /marketing/contact_form_data`  – list contact forms

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use mrportal_core::entities::NotificationStatus;
use mrportal_core::entities::contacts::{ContactForm, ContactPage, SampleRequest};
use mrportal_core::mail::compose;
use mrportal_sdk::objects::forms::{
    ContactFormCreated, ContactFormList, ContactFormRequest, ContactPageRequest,
    ContactPageResponse, SampleRequestRequest, SubmissionResponse,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::extractors::ValidatedJson;
use crate::state::AppState;

/// Build the lead-capture router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send-email", post(send_sample_report))
        .route(
            "/marketing/contact_page_data",
            post(submit_contact_page).get(list_contact_pages),
        )
        .route("/marketing/contact_form", post(submit_contact_form))
        .route("/marketing/contact_form_data", get(list_contact_forms))
}

fn outcome(status: NotificationStatus, sent: &str, pending: &str) -> String {
    match status {
        NotificationStatus::Sent => sent.to_string(),
        _ => pending.to_string(),
    }
}

/// `POST /send-email`: store a sample report request and mail the link.
async fn send_sample_report(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SampleRequestRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = SampleRequest::new(Uuid::now_v7(), request, OffsetDateTime::now_utc());
    let notification = compose::sample_request(&request);
    let (request, notification) = state
        .leads
        .submit_sample_request(request, notification)
        .await?;

    let status = state.notifier.deliver(&notification).await;
    Ok(Json(SubmissionResponse {
        message: outcome(
            status,
            "Email sent and data saved successfully!",
            "Data saved successfully; the email will be sent shortly.",
        ),
        id: request.id,
        notification_status: status.into(),
    }))
}

/// `POST /marketing/contact_page_data`: store a contact page message.
async fn submit_contact_page(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ContactPageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let page = ContactPage::new(Uuid::now_v7(), request, OffsetDateTime::now_utc());
    let notification = compose::contact_page(&page, &state.config.mail.notify_to);
    let (page, notification) = state.leads.submit_contact_page(page, notification).await?;

    let status = state.notifier.deliver(&notification).await;
    Ok(Json(SubmissionResponse {
        message: "Form submitted successfully!".to_string(),
        id: page.id,
        notification_status: status.into(),
    }))
}

/// `GET /marketing/contact_page_data`: every contact page message.
async fn list_contact_pages(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let pages: Vec<ContactPageResponse> = state
        .leads
        .list_contact_pages()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(pages))
}

/// `POST /marketing/contact_form`: store a full contact form.
async fn submit_contact_form(
    State(state): State<AppState>,
    ValidatedJson(submission): ValidatedJson<ContactFormRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let form = ContactForm::new(Uuid::now_v7(), submission, OffsetDateTime::now_utc());
    let notification = compose::contact_form(&form, &state.config.mail.notify_to);
    let (form, notification) = state.leads.submit_contact_form(form, notification).await?;

    let status = state.notifier.deliver(&notification).await;
    Ok((
        StatusCode::CREATED,
        Json(ContactFormCreated {
            message: outcome(
                status,
                "Form submitted successfully and email sent!",
                "Form submitted successfully; the email will be sent shortly.",
            ),
            form: form.into(),
            notification_status: status.into(),
        }),
    ))
}

/// `GET /marketing/contact_form_data`: every contact form, 404 when none.
async fn list_contact_forms(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let forms = state.leads.list_contact_forms().await?;
    if forms.is_empty() {
        return Err(ApiError::NotFound("No contact form submissions found."));
    }
    Ok(Json(ContactFormList {
        message: "Form submissions retrieved successfully.".to_string(),
        forms: forms.into_iter().map(Into::into).collect(),
    }))
}
