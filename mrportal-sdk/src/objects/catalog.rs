//! Catalog objects: reports, infographics and press releases.
//!
//! Catalog records are uploaded as multipart forms, so every form field
//! arrives as text and is parsed here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Validate, ValidationErrors, non_blank};

// ---------------------------------------------------------------------------
// Licensing
// ---------------------------------------------------------------------------

/// Access-control mode of a purchasable report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseType {
    /// One named user (`currentUserEmail`).
    Single,
    /// An explicit allow-list (`allowedEmails`).
    Multi,
    /// Unrestricted.
    #[default]
    Enterprise,
}

impl std::fmt::Display for LicenseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseType::Single => write!(f, "single"),
            LicenseType::Multi => write!(f, "multi"),
            LicenseType::Enterprise => write!(f, "enterprise"),
        }
    }
}

impl FromStr for LicenseType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(LicenseType::Single),
            "multi" => Ok(LicenseType::Multi),
            "enterprise" => Ok(LicenseType::Enterprise),
            _ => Err(()),
        }
    }
}

/// License fields of a report, valid by construction.
///
/// Exactly the field belonging to the license type is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseTerms {
    Single { current_user_email: String },
    Multi { allowed_emails: Vec<String> },
    Enterprise,
}

impl LicenseTerms {
    /// Build terms for `license_type`, dropping whichever field does not
    /// belong to it.
    pub fn new(
        license_type: LicenseType,
        allowed_emails: Vec<String>,
        current_user_email: Option<String>,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let terms = match license_type {
            LicenseType::Multi => {
                let allowed_emails = normalise_emails(&mut errors, "allowedEmails", allowed_emails);
                if allowed_emails.is_empty() && errors.is_empty() {
                    errors.add("allowedEmails", "is required for multi-user licenses");
                }
                LicenseTerms::Multi { allowed_emails }
            }
            LicenseType::Single => match non_blank(current_user_email) {
                Some(email) => match normalise_email(&email) {
                    Some(current_user_email) => LicenseTerms::Single { current_user_email },
                    None => {
                        errors.add("currentUserEmail", "is not a valid email address");
                        LicenseTerms::Enterprise
                    }
                },
                None => {
                    errors.add("currentUserEmail", "is required for single-user licenses");
                    LicenseTerms::Enterprise
                }
            },
            LicenseType::Enterprise => LicenseTerms::Enterprise,
        };
        errors.into_result().map(|()| terms)
    }

    pub fn license_type(&self) -> LicenseType {
        match self {
            LicenseTerms::Single { .. } => LicenseType::Single,
            LicenseTerms::Multi { .. } => LicenseType::Multi,
            LicenseTerms::Enterprise => LicenseType::Enterprise,
        }
    }

    pub fn allowed_emails(&self) -> &[String] {
        match self {
            LicenseTerms::Multi { allowed_emails } => allowed_emails,
            _ => &[],
        }
    }

    pub fn current_user_email(&self) -> Option<&str> {
        match self {
            LicenseTerms::Single { current_user_email } => Some(current_user_email),
            _ => None,
        }
    }

    /// Whether `email` may open a report licensed under these terms.
    pub fn grants(&self, email: Option<&str>) -> bool {
        let email = email.and_then(normalise_email);
        match self {
            LicenseTerms::Enterprise => true,
            LicenseTerms::Single { current_user_email } => {
                email.as_deref() == Some(current_user_email.as_str())
            }
            LicenseTerms::Multi { allowed_emails } => email
                .map(|e| allowed_emails.iter().any(|a| *a == e))
                .unwrap_or(false),
        }
    }
}

fn normalise_email(email: &str) -> Option<String> {
    let email = email.trim().to_ascii_lowercase();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || email.contains(' ') {
        return None;
    }
    Some(email)
}

fn normalise_emails(errors: &mut ValidationErrors, field: &str, emails: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(emails.len());
    for raw in emails {
        if raw.trim().is_empty() {
            continue;
        }
        match normalise_email(&raw) {
            Some(email) if !out.contains(&email) => out.push(email),
            Some(_) => {}
            None => errors.add(field, format!("'{}' is not a valid email address", raw.trim())),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Form parsing helpers
// ---------------------------------------------------------------------------

/// Optional price tiers shared by reports and infographics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceTiers {
    pub single_user: Option<Decimal>,
    pub multi_user: Option<Decimal>,
    pub enterprise: Option<Decimal>,
}

fn parse_price(errors: &mut ValidationErrors, field: &str, value: Option<String>) -> Option<Decimal> {
    let value = non_blank(value)?;
    match Decimal::from_str(&value) {
        Ok(price) if price.is_sign_negative() => {
            errors.add(field, "must not be negative");
            None
        }
        Ok(price) => Some(price),
        Err(_) => {
            errors.add(field, "must be a number");
            None
        }
    }
}

fn parse_prices(
    errors: &mut ValidationErrors,
    single_user: Option<String>,
    multi_user: Option<String>,
    enterprise: Option<String>,
) -> PriceTiers {
    PriceTiers {
        single_user: parse_price(errors, "singleUserPrice", single_user),
        multi_user: parse_price(errors, "multiUserPrice", multi_user),
        enterprise: parse_price(errors, "enterprisePrice", enterprise),
    }
}

fn parse_license_type(errors: &mut ValidationErrors, value: Option<String>) -> Option<LicenseType> {
    let value = non_blank(value)?;
    match value.parse() {
        Ok(license_type) => Some(license_type),
        Err(()) => {
            errors.add("licenseType", "must be one of single, multi, enterprise");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Raw fields of a report upload or update form.
#[derive(Debug, Clone, Default)]
pub struct ReportForm {
    pub title: Option<String>,
    pub category: Option<String>,
    pub single_user_price: Option<String>,
    pub multi_user_price: Option<String>,
    pub enterprise_price: Option<String>,
    pub summary: Option<String>,
    pub table_of_contents: Option<String>,
    pub methodology: Option<String>,
    pub description: Option<String>,
    pub download_sample_report: Option<String>,
    pub report_id: Option<String>,
    pub license_type: Option<String>,
    pub allowed_emails: Option<Vec<String>>,
    pub current_user_email: Option<String>,
}

/// A checked report creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub title: Option<String>,
    pub category: Option<String>,
    pub prices: PriceTiers,
    pub summary: Option<String>,
    pub table_of_contents: Option<String>,
    pub methodology: Option<String>,
    pub description: Option<String>,
    pub download_sample_report: Option<String>,
    pub report_id: Option<String>,
    pub license: LicenseTerms,
}

/// A checked partial update of a report. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub prices: PriceTiers,
    pub summary: Option<String>,
    pub table_of_contents: Option<String>,
    pub methodology: Option<String>,
    pub description: Option<String>,
    pub download_sample_report: Option<String>,
    pub report_id: Option<String>,
    pub license_type: Option<LicenseType>,
    pub allowed_emails: Option<Vec<String>>,
    pub current_user_email: Option<String>,
}

impl ReportPatch {
    /// Whether the patch touches any licensing field.
    pub fn touches_license(&self) -> bool {
        self.license_type.is_some()
            || self.allowed_emails.is_some()
            || self.current_user_email.is_some()
    }

    /// Merge the licensing fields of this patch over `current`.
    pub fn merge_license(&self, current: &LicenseTerms) -> Result<LicenseTerms, ValidationErrors> {
        let license_type = self.license_type.unwrap_or(current.license_type());
        let allowed_emails = self
            .allowed_emails
            .clone()
            .unwrap_or_else(|| current.allowed_emails().to_vec());
        let current_user_email = self
            .current_user_email
            .clone()
            .or_else(|| current.current_user_email().map(str::to_string));
        LicenseTerms::new(license_type, allowed_emails, current_user_email)
    }
}

impl Validate for ReportForm {
    type Valid = ReportDraft;

    fn validate(self) -> Result<ReportDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let prices = parse_prices(
            &mut errors,
            self.single_user_price,
            self.multi_user_price,
            self.enterprise_price,
        );
        let license_type = parse_license_type(&mut errors, self.license_type).unwrap_or_default();
        let license = match LicenseTerms::new(
            license_type,
            self.allowed_emails.unwrap_or_default(),
            self.current_user_email,
        ) {
            Ok(terms) => Some(terms),
            Err(license_errors) => {
                for f in license_errors.fields() {
                    errors.add(&f.field, f.message.clone());
                }
                None
            }
        };
        match license {
            Some(license) if errors.is_empty() => Ok(ReportDraft {
                title: non_blank(self.title),
                category: non_blank(self.category),
                prices,
                summary: non_blank(self.summary),
                table_of_contents: non_blank(self.table_of_contents),
                methodology: non_blank(self.methodology),
                description: non_blank(self.description),
                download_sample_report: non_blank(self.download_sample_report),
                report_id: non_blank(self.report_id),
                license,
            }),
            _ => Err(errors),
        }
    }
}

impl ReportForm {
    /// Parse the form as a partial update.
    pub fn into_patch(self) -> Result<ReportPatch, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let prices = parse_prices(
            &mut errors,
            self.single_user_price,
            self.multi_user_price,
            self.enterprise_price,
        );
        let license_type = parse_license_type(&mut errors, self.license_type);
        let patch = ReportPatch {
            title: non_blank(self.title),
            category: non_blank(self.category),
            prices,
            summary: non_blank(self.summary),
            table_of_contents: non_blank(self.table_of_contents),
            methodology: non_blank(self.methodology),
            description: non_blank(self.description),
            download_sample_report: non_blank(self.download_sample_report),
            report_id: non_blank(self.report_id),
            license_type,
            allowed_emails: self.allowed_emails.filter(|emails| !emails.is_empty()),
            current_user_email: non_blank(self.current_user_email),
        };
        errors.into_result().map(|()| patch)
    }
}

/// A report as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: Uuid,
    pub title: Option<String>,
    pub category: Option<String>,
    pub single_user_price: Option<Decimal>,
    pub multi_user_price: Option<Decimal>,
    pub enterprise_price: Option<Decimal>,
    pub summary: Option<String>,
    pub table_of_contents: Option<String>,
    pub methodology: Option<String>,
    pub description: Option<String>,
    pub download_sample_report: Option<String>,
    pub report_id: String,
    pub file_path: Option<String>,
    pub license_type: LicenseType,
    pub allowed_emails: Vec<String>,
    pub current_user_email: Option<String>,
    pub access_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Body of `POST /reports/verify-access`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyReportAccessRequest {
    pub token: Option<String>,
    pub email: Option<String>,
}

/// A checked report access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportAccessCheck {
    pub token: String,
    pub email: Option<String>,
}

impl Validate for VerifyReportAccessRequest {
    type Valid = ReportAccessCheck;

    fn validate(self) -> Result<ReportAccessCheck, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let token = errors.require_text("token", self.token);
        match token {
            Some(token) => Ok(ReportAccessCheck {
                token,
                email: non_blank(self.email),
            }),
            None => Err(errors),
        }
    }
}

/// Response of a granted report access check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportAccessResponse {
    pub message: String,
    pub report_id: String,
    pub license_type: LicenseType,
    pub expires_at: i64,
}

// ---------------------------------------------------------------------------
// Infographics
// ---------------------------------------------------------------------------

/// Raw fields of an infographic upload form.
#[derive(Debug, Clone, Default)]
pub struct InfographicForm {
    pub title: Option<String>,
    pub category: Option<String>,
    pub single_user_price: Option<String>,
    pub multi_user_price: Option<String>,
    pub enterprise_price: Option<String>,
    pub summary: Option<String>,
    pub table_of_contents: Option<String>,
    pub methodology: Option<String>,
    pub infographics: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub report_id: Option<String>,
}

/// A checked infographic creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfographicDraft {
    pub title: Option<String>,
    pub category: Option<String>,
    pub prices: PriceTiers,
    pub summary: Option<String>,
    pub table_of_contents: Option<String>,
    pub methodology: Option<String>,
    pub infographics: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub report_id: Option<String>,
}

impl Validate for InfographicForm {
    type Valid = InfographicDraft;

    fn validate(self) -> Result<InfographicDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let prices = parse_prices(
            &mut errors,
            self.single_user_price,
            self.multi_user_price,
            self.enterprise_price,
        );
        errors.into_result().map(|()| InfographicDraft {
            title: non_blank(self.title),
            category: non_blank(self.category),
            prices,
            summary: non_blank(self.summary),
            table_of_contents: non_blank(self.table_of_contents),
            methodology: non_blank(self.methodology),
            infographics: non_blank(self.infographics),
            description: non_blank(self.description),
            image_url: non_blank(self.image_url),
            report_id: non_blank(self.report_id),
        })
    }
}

/// An infographic as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfographicResponse {
    pub id: Uuid,
    pub title: Option<String>,
    pub category: Option<String>,
    pub single_user_price: Option<Decimal>,
    pub multi_user_price: Option<Decimal>,
    pub enterprise_price: Option<Decimal>,
    pub summary: Option<String>,
    pub table_of_contents: Option<String>,
    pub methodology: Option<String>,
    pub infographics: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub report_id: Option<String>,
    pub file_path: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

// ---------------------------------------------------------------------------
// Press releases
// ---------------------------------------------------------------------------

/// Raw fields of a press release form. Used for both create and update;
/// on update a `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressReleaseForm {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub report_id: Option<String>,
}

impl Validate for PressReleaseForm {
    type Valid = PressReleaseForm;

    fn validate(self) -> Result<PressReleaseForm, ValidationErrors> {
        Ok(PressReleaseForm {
            title: non_blank(self.title),
            category: non_blank(self.category),
            description: non_blank(self.description),
            report_id: non_blank(self.report_id),
        })
    }
}

/// A press release as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressReleaseResponse {
    pub id: Uuid,
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub report_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// Column a catalog listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    Title,
    Category,
    SingleUserPrice,
    MultiUserPrice,
    EnterprisePrice,
}

impl SortKey {
    /// Keys valid for reports and infographics.
    pub const PRICED: &'static [SortKey] = &[
        SortKey::CreatedAt,
        SortKey::Title,
        SortKey::Category,
        SortKey::SingleUserPrice,
        SortKey::MultiUserPrice,
        SortKey::EnterprisePrice,
    ];
    /// Keys valid for press releases.
    pub const UNPRICED: &'static [SortKey] =
        &[SortKey::CreatedAt, SortKey::Title, SortKey::Category];

    /// Name used in the `sortBy` query parameter.
    pub fn query_name(self) -> &'static str {
        match self {
            SortKey::CreatedAt => "createdAt",
            SortKey::Title => "title",
            SortKey::Category => "category",
            SortKey::SingleUserPrice => "singleUserPrice",
            SortKey::MultiUserPrice => "multiUserPrice",
            SortKey::EnterprisePrice => "enterprisePrice",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Query of the catalog listing endpoints.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// Checked listing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    pub page: i64,
    pub limit: i64,
    pub sort: SortKey,
    pub order: SortOrder,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: SortKey::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

impl ListParams {
    /// Number of records skipped before this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl ListQuery {
    /// Check the query, accepting only the `allowed` sort keys.
    pub fn into_params(self, allowed: &[SortKey]) -> Result<ListParams, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let page = match non_blank(self.page).map(|p| p.parse::<i64>()) {
            None => DEFAULT_PAGE,
            Some(Ok(page)) if page >= 1 => page,
            Some(_) => {
                errors.add("page", "must be a positive integer");
                DEFAULT_PAGE
            }
        };
        let limit = match non_blank(self.limit).map(|l| l.parse::<i64>()) {
            None => DEFAULT_LIMIT,
            Some(Ok(limit)) if limit >= 1 => limit.min(MAX_LIMIT),
            Some(_) => {
                errors.add("limit", "must be a positive integer");
                DEFAULT_LIMIT
            }
        };
        let sort = match non_blank(self.sort_by) {
            None => SortKey::CreatedAt,
            Some(name) => match allowed.iter().find(|k| k.query_name() == name) {
                Some(key) => *key,
                None => {
                    let names: Vec<_> = allowed.iter().map(|k| k.query_name()).collect();
                    errors.add("sortBy", format!("must be one of {}", names.join(", ")));
                    SortKey::CreatedAt
                }
            },
        };
        let order = match non_blank(self.order).map(|o| o.to_ascii_lowercase()) {
            None => SortOrder::Desc,
            Some(o) if o == "desc" => SortOrder::Desc,
            Some(o) if o == "asc" => SortOrder::Asc,
            Some(_) => {
                errors.add("order", "must be asc or desc");
                SortOrder::Desc
            }
        };
        errors.into_result().map(|()| ListParams {
            page,
            limit,
            sort,
            order,
        })
    }
}

/// One page of a catalog listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub message: String,
    pub data: Vec<T>,
    /// Size of the whole collection.
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_form(license: &str) -> ReportForm {
        ReportForm {
            title: Some("EV Battery Market".into()),
            single_user_price: Some("2999".into()),
            license_type: Some(license.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_multi_license_requires_allowed_emails() {
        let err = report_form("multi").validate().unwrap_err();
        assert_eq!(err.fields()[0].field, "allowedEmails");

        let mut form = report_form("multi");
        form.allowed_emails = Some(vec!["A@x.com".into(), "b@x.com".into(), "a@x.com".into()]);
        form.current_user_email = Some("ignored@x.com".into());
        let draft = form.validate().unwrap();
        assert_eq!(draft.license.allowed_emails(), ["a@x.com", "b@x.com"]);
        assert_eq!(draft.license.current_user_email(), None);
    }

    #[test]
    fn test_single_license_requires_current_user() {
        let err = report_form("single").validate().unwrap_err();
        assert_eq!(err.fields()[0].field, "currentUserEmail");

        let mut form = report_form("single");
        form.current_user_email = Some("buyer@x.com".into());
        form.allowed_emails = Some(vec!["other@x.com".into()]);
        let draft = form.validate().unwrap();
        assert_eq!(draft.license.current_user_email(), Some("buyer@x.com"));
        assert!(draft.license.allowed_emails().is_empty());
    }

    #[test]
    fn test_license_defaults_to_enterprise() {
        let form = ReportForm::default();
        let draft = form.validate().unwrap();
        assert_eq!(draft.license, LicenseTerms::Enterprise);
    }

    #[test]
    fn test_bad_price_and_license_are_reported_together() {
        let form = ReportForm {
            single_user_price: Some("cheap".into()),
            license_type: Some("team".into()),
            ..Default::default()
        };
        let err = form.validate().unwrap_err();
        let fields: Vec<_> = err.fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["singleUserPrice", "licenseType"]);
    }

    #[test]
    fn test_patch_merges_license_over_current_terms() {
        let current = LicenseTerms::Single {
            current_user_email: "buyer@x.com".into(),
        };
        let patch = ReportForm {
            license_type: Some("multi".into()),
            ..Default::default()
        }
        .into_patch()
        .unwrap();
        // switching to multi without an allow-list is rejected
        assert!(patch.merge_license(&current).is_err());

        let patch = ReportForm {
            license_type: Some("multi".into()),
            allowed_emails: Some(vec!["team@x.com".into()]),
            ..Default::default()
        }
        .into_patch()
        .unwrap();
        let merged = patch.merge_license(&current).unwrap();
        assert_eq!(merged.license_type(), LicenseType::Multi);
        assert_eq!(merged.current_user_email(), None);
    }

    #[test]
    fn test_terms_grant_access() {
        let multi = LicenseTerms::Multi {
            allowed_emails: vec!["a@x.com".into()],
        };
        assert!(multi.grants(Some(" A@X.com ")));
        assert!(!multi.grants(Some("b@x.com")));
        assert!(!multi.grants(None));
        assert!(LicenseTerms::Enterprise.grants(None));
    }

    #[test]
    fn test_list_query_defaults() {
        let params = ListQuery::default().into_params(SortKey::PRICED).unwrap();
        assert_eq!(params, ListParams::default());
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_list_query_second_page_offset() {
        let params = ListQuery {
            page: Some("2".into()),
            limit: Some("10".into()),
            sort_by: Some("title".into()),
            order: Some("ASC".into()),
        }
        .into_params(SortKey::PRICED)
        .unwrap();
        assert_eq!(params.offset(), 10);
        assert_eq!(params.sort, SortKey::Title);
        assert_eq!(params.order, SortOrder::Asc);
    }

    #[test]
    fn test_list_query_rejects_unknown_sort_key() {
        let err = ListQuery {
            sort_by: Some("singleUserPrice".into()),
            ..Default::default()
        }
        .into_params(SortKey::UNPRICED)
        .unwrap_err();
        assert_eq!(err.fields()[0].field, "sortBy");

        let err = ListQuery {
            page: Some("0".into()),
            order: Some("sideways".into()),
            ..Default::default()
        }
        .into_params(SortKey::PRICED)
        .unwrap_err();
        assert_eq!(err.fields().len(), 2);
    }
}
