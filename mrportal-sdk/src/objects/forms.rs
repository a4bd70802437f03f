//! Lead-capture forms: the contact form, the contact page and sample report
//! requests.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Validate, ValidationErrors, non_blank};

/// Delivery state of the e-mail that accompanies a form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    /// Not delivered yet; the retry worker will try again.
    Pending,
    Sent,
    /// Gave up after the maximum number of attempts.
    Failed,
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationStatus::Pending => write!(f, "pending"),
            NotificationStatus::Sent => write!(f, "sent"),
            NotificationStatus::Failed => write!(f, "failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// POST /marketing/contact_form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContactFormRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company_name: Option<String>,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFormSubmission {
    pub name: String,
    pub email: String,
    pub company_name: String,
    pub phone_number: String,
    pub country: String,
    pub street_address: String,
    pub city: String,
    pub postal_code: String,
    pub notes: Option<String>,
}

impl Validate for ContactFormRequest {
    type Valid = ContactFormSubmission;

    fn validate(self) -> Result<ContactFormSubmission, ValidationErrors> {
        let mut errors = ValidationErrors::new("All fields are required.");
        let name = errors.require_text("name", self.name);
        let email = errors.require_text("email", self.email);
        let company_name = errors.require_text("companyName", self.company_name);
        let phone_number = errors.require_text("phoneNumber", self.phone_number);
        let country = errors.require_text("country", self.country);
        let street_address = errors.require_text("streetAddress", self.street_address);
        let city = errors.require_text("city", self.city);
        let postal_code = errors.require_text("postalCode", self.postal_code);

        match (
            name,
            email,
            company_name,
            phone_number,
            country,
            street_address,
            city,
            postal_code,
        ) {
            (
                Some(name),
                Some(email),
                Some(company_name),
                Some(phone_number),
                Some(country),
                Some(street_address),
                Some(city),
                Some(postal_code),
            ) => Ok(ContactFormSubmission {
                name,
                email,
                company_name,
                phone_number,
                country,
                street_address,
                city,
                postal_code,
                notes: non_blank(self.notes),
            }),
            _ => Err(errors),
        }
    }
}

/// A stored contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactFormResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company_name: String,
    pub phone_number: String,
    pub country: String,
    pub street_address: String,
    pub city: String,
    pub postal_code: String,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Response of `POST /marketing/contact_form`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactFormCreated {
    pub message: String,
    pub form: ContactFormResponse,
    pub notification_status: NotificationStatus,
}

/// Response of `GET /marketing/contact_form_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactFormList {
    pub message: String,
    pub forms: Vec<ContactFormResponse>,
}

// ---------------------------------------------------------------------------
// POST /marketing/contact_page_data
// ---------------------------------------------------------------------------

/// Contact page submission. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContactPageRequest {
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub message: Option<String>,
    pub terms: Option<bool>,
}

impl Validate for ContactPageRequest {
    type Valid = ContactPageRequest;

    fn validate(self) -> Result<ContactPageRequest, ValidationErrors> {
        Ok(ContactPageRequest {
            full_name: non_blank(self.full_name),
            company_name: non_blank(self.company_name),
            email: non_blank(self.email),
            phone: non_blank(self.phone),
            country: non_blank(self.country),
            street: non_blank(self.street),
            city: non_blank(self.city),
            zip: non_blank(self.zip),
            message: non_blank(self.message),
            terms: self.terms,
        })
    }
}

/// A stored contact page submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPageResponse {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub message: Option<String>,
    pub terms: Option<bool>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

// ---------------------------------------------------------------------------
// POST /send-email
// ---------------------------------------------------------------------------

/// Sample report request. The download link is mailed to `user_email`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SampleRequestRequest {
    pub user_name: Option<String>,
    pub user_company: Option<String>,
    pub user_email: Option<String>,
    pub user_phone: Option<String>,
    pub user_message: Option<String>,
    pub user_link: Option<String>,
    pub report_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRequest {
    pub user_name: Option<String>,
    pub user_company: Option<String>,
    pub user_email: String,
    pub user_phone: Option<String>,
    pub user_message: Option<String>,
    pub user_link: String,
    pub report_title: Option<String>,
}

impl Validate for SampleRequestRequest {
    type Valid = SampleRequest;

    fn validate(self) -> Result<SampleRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let user_email = errors.require_text("user_email", self.user_email);
        let user_link = errors.require_text("user_link", self.user_link);
        if let Some(link) = &user_link {
            let lower = link.to_ascii_lowercase();
            if !(lower.starts_with("https://") || lower.starts_with("http://")) {
                errors.add("user_link", "must be an http(s) URL");
            }
        }
        match (user_email, user_link) {
            (Some(user_email), Some(user_link)) if errors.is_empty() => Ok(SampleRequest {
                user_name: non_blank(self.user_name),
                user_company: non_blank(self.user_company),
                user_email,
                user_phone: non_blank(self.user_phone),
                user_message: non_blank(self.user_message),
                user_link,
                report_title: non_blank(self.report_title),
            }),
            _ => Err(errors),
        }
    }
}

/// Response of `POST /send-email` and `POST /marketing/contact_page_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub message: String,
    pub id: Uuid,
    pub notification_status: NotificationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_form_lists_missing_fields() {
        let request: ContactFormRequest =
            serde_json::from_str(r#"{"name":"Asha","email":"asha@x.com","city":" "}"#).unwrap();
        let err = request.validate().unwrap_err();
        let fields: Vec<_> = err.fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "companyName",
                "phoneNumber",
                "country",
                "streetAddress",
                "city",
                "postalCode"
            ]
        );
    }

    #[test]
    fn test_contact_form_notes_are_optional() {
        let request = ContactFormRequest {
            name: Some("Asha".into()),
            email: Some("asha@x.com".into()),
            company_name: Some("Acme".into()),
            phone_number: Some("+91 99999".into()),
            country: Some("India".into()),
            street_address: Some("1 Main St".into()),
            city: Some("Pune".into()),
            postal_code: Some("411001".into()),
            notes: None,
        };
        let valid = request.validate().unwrap();
        assert_eq!(valid.notes, None);
        assert_eq!(valid.city, "Pune");
    }

    #[test]
    fn test_contact_page_accepts_empty_body() {
        let request: ContactPageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.validate().unwrap(), ContactPageRequest::default());
    }

    #[test]
    fn test_sample_request_needs_recipient_and_link() {
        let err = SampleRequestRequest::default().validate().unwrap_err();
        let fields: Vec<_> = err.fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["user_email", "user_link"]);

        let err = SampleRequestRequest {
            user_email: Some("a@x.com".into()),
            user_link: Some("javascript:alert(1)".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.fields()[0].message, "must be an http(s) URL");
    }

    #[test]
    fn test_notification_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&NotificationStatus::Pending).unwrap(),
            r#""pending""#
        );
    }
}
