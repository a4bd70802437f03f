use crate::entities::{LicenseType, Page, push_page_clause};
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use mrportal_sdk::objects::catalog::{
    LicenseTerms, ListParams, ReportDraft, ReportPatch, ReportResponse,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

const REPORT_COLUMNS: &str = "id, title, category, single_user_price, multi_user_price, \
    enterprise_price, summary, table_of_contents, methodology, description, \
    download_sample_report, report_id, file_path, license_type, allowed_emails, \
    current_user_email, access_token, created_at";

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Report {
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
    /// Public catalogue identifier, unique.
    pub report_id: String,
    pub file_path: Option<String>,
    pub license_type: LicenseType,
    pub allowed_emails: Vec<String>,
    pub current_user_email: Option<String>,
    pub access_token: String,
    pub created_at: OffsetDateTime,
}

/// Generate a catalogue identifier: `RPT-` and 12 upper-case hex digits.
pub fn generate_report_id() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("RPT-{}", simple[..12].to_ascii_uppercase())
}

impl Report {
    /// License terms of the stored row.
    ///
    /// Rows are checked on write, so the fallbacks only apply to data
    /// written outside the application and never grant access.
    pub fn license_terms(&self) -> LicenseTerms {
        match self.license_type {
            LicenseType::Enterprise => LicenseTerms::Enterprise,
            LicenseType::Multi => LicenseTerms::Multi {
                allowed_emails: self.allowed_emails.clone(),
            },
            LicenseType::Single => LicenseTerms::Single {
                current_user_email: self.current_user_email.clone().unwrap_or_default(),
            },
        }
    }

    fn set_license(&mut self, terms: &LicenseTerms) {
        self.license_type = terms.license_type().into();
        self.allowed_emails = terms.allowed_emails().to_vec();
        self.current_user_email = terms.current_user_email().map(str::to_string);
    }

    /// Apply a patch whose license fields were already merged into `license`.
    pub fn apply_patch(&mut self, patch: ReportPatch, license: &LicenseTerms) {
        let ReportPatch {
            title,
            category,
            prices,
            summary,
            table_of_contents,
            methodology,
            description,
            download_sample_report,
            report_id,
            ..
        } = patch;
        fn keep<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }
        keep(&mut self.title, title);
        keep(&mut self.category, category);
        keep(&mut self.single_user_price, prices.single_user);
        keep(&mut self.multi_user_price, prices.multi_user);
        keep(&mut self.enterprise_price, prices.enterprise);
        keep(&mut self.summary, summary);
        keep(&mut self.table_of_contents, table_of_contents);
        keep(&mut self.methodology, methodology);
        keep(&mut self.description, description);
        keep(&mut self.download_sample_report, download_sample_report);
        if let Some(report_id) = report_id {
            self.report_id = report_id;
        }
        self.set_license(license);
    }
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        ReportResponse {
            id: report.id,
            title: report.title,
            category: report.category,
            single_user_price: report.single_user_price,
            multi_user_price: report.multi_user_price,
            enterprise_price: report.enterprise_price,
            summary: report.summary,
            table_of_contents: report.table_of_contents,
            methodology: report.methodology,
            description: report.description,
            download_sample_report: report.download_sample_report,
            report_id: report.report_id,
            file_path: report.file_path,
            license_type: report.license_type.into(),
            allowed_emails: report.allowed_emails,
            current_user_email: report.current_user_email,
            access_token: report.access_token,
            created_at: report.created_at,
        }
    }
}

/// Data for inserting a new report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportInsert {
    pub id: Uuid,
    pub report_id: String,
    pub draft: ReportDraft,
    pub file_path: Option<String>,
    pub access_token: String,
}

impl ReportInsert {
    /// Build the row as it will be stored, with `created_at` set to `now`.
    pub fn into_report(self, created_at: OffsetDateTime) -> Report {
        let ReportInsert {
            id,
            report_id,
            draft,
            file_path,
            access_token,
        } = self;
        Report {
            id,
            title: draft.title,
            category: draft.category,
            single_user_price: draft.prices.single_user,
            multi_user_price: draft.prices.multi_user,
            enterprise_price: draft.prices.enterprise,
            summary: draft.summary,
            table_of_contents: draft.table_of_contents,
            methodology: draft.methodology,
            description: draft.description,
            download_sample_report: draft.download_sample_report,
            report_id,
            file_path,
            license_type: draft.license.license_type().into(),
            allowed_emails: draft.license.allowed_emails().to_vec(),
            current_user_email: draft.license.current_user_email().map(str::to_string),
            access_token,
            created_at,
        }
    }
}

/// Insert a report. Returns `None` when `report_id` is taken.
#[derive(Debug, Clone)]
pub struct InsertReport {
    pub report: ReportInsert,
}

impl Processor<InsertReport> for DatabaseProcessor {
    type Output = Option<Report>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertReport")]
    async fn process(&self, cmd: InsertReport) -> Result<Option<Report>, sqlx::Error> {
        let r = cmd.report.into_report(OffsetDateTime::now_utc());
        sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO reports (id, title, category, single_user_price, multi_user_price,
                enterprise_price, summary, table_of_contents, methodology, description,
                download_sample_report, report_id, file_path, license_type, allowed_emails,
                current_user_email, access_token)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (report_id) DO NOTHING
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(r.id)
        .bind(r.title)
        .bind(r.category)
        .bind(r.single_user_price)
        .bind(r.multi_user_price)
        .bind(r.enterprise_price)
        .bind(r.summary)
        .bind(r.table_of_contents)
        .bind(r.methodology)
        .bind(r.description)
        .bind(r.download_sample_report)
        .bind(r.report_id)
        .bind(r.file_path)
        .bind(r.license_type)
        .bind(r.allowed_emails)
        .bind(r.current_user_email)
        .bind(r.access_token)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetReport {
    pub id: Uuid,
}

impl Processor<GetReport> for DatabaseProcessor {
    type Output = Option<Report>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetReport")]
    async fn process(&self, query: GetReport) -> Result<Option<Report>, sqlx::Error> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"
        ))
        .bind(query.id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetReportByReportId {
    pub report_id: String,
}

impl Processor<GetReportByReportId> for DatabaseProcessor {
    type Output = Option<Report>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetReportByReportId")]
    async fn process(&self, query: GetReportByReportId) -> Result<Option<Report>, sqlx::Error> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE report_id = $1"
        ))
        .bind(query.report_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Overwrite every mutable column of a report.
///
/// Returns `None` when the report does not exist. A `report_id` clash
/// surfaces as a unique violation.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub report: Report,
}

impl Processor<UpdateReport> for DatabaseProcessor {
    type Output = Option<Report>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdateReport")]
    async fn process(&self, cmd: UpdateReport) -> Result<Option<Report>, sqlx::Error> {
        let r = cmd.report;
        sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports SET
                title = $2, category = $3, single_user_price = $4, multi_user_price = $5,
                enterprise_price = $6, summary = $7, table_of_contents = $8, methodology = $9,
                description = $10, download_sample_report = $11, report_id = $12,
                file_path = $13, license_type = $14, allowed_emails = $15,
                current_user_email = $16, access_token = $17
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(r.id)
        .bind(r.title)
        .bind(r.category)
        .bind(r.single_user_price)
        .bind(r.multi_user_price)
        .bind(r.enterprise_price)
        .bind(r.summary)
        .bind(r.table_of_contents)
        .bind(r.methodology)
        .bind(r.description)
        .bind(r.download_sample_report)
        .bind(r.report_id)
        .bind(r.file_path)
        .bind(r.license_type)
        .bind(r.allowed_emails)
        .bind(r.current_user_email)
        .bind(r.access_token)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct ListReports {
    pub params: ListParams,
}

impl Processor<ListReports> for DatabaseProcessor {
    type Output = Page<Report>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListReports")]
    async fn process(&self, query: ListReports) -> Result<Page<Report>, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(&self.pool)
            .await?;
        let mut builder = sqlx::QueryBuilder::new(format!("SELECT {REPORT_COLUMNS} FROM reports"));
        push_page_clause(&mut builder, &query.params);
        let items = builder
            .build_query_as::<Report>()
            .fetch_all(&self.pool)
            .await?;
        Ok(Page { items, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrportal_sdk::objects::catalog::{PriceTiers, ReportForm};
    use mrportal_sdk::objects::Validate;

    fn stored_single() -> Report {
        let draft = ReportForm {
            title: Some("Solar Inverters".into()),
            license_type: Some("single".into()),
            current_user_email: Some("buyer@x.com".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        ReportInsert {
            id: Uuid::now_v7(),
            report_id: "RPT-1".into(),
            draft,
            file_path: None,
            access_token: "t".into(),
        }
        .into_report(OffsetDateTime::now_utc())
    }

    #[test]
    fn test_generated_report_id_shape() {
        let id = generate_report_id();
        assert_eq!(id.len(), 16);
        assert!(id.starts_with("RPT-"));
        assert!(
            id[4..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        );
    }

    #[test]
    fn test_apply_patch_switches_license_and_clears_inactive_field() {
        let mut report = stored_single();
        let patch = ReportPatch {
            title: Some("Solar Inverters 2026".into()),
            prices: PriceTiers {
                single_user: Some(Decimal::new(4999, 0)),
                ..Default::default()
            },
            license_type: Some(LicenseType::Multi.into()),
            allowed_emails: Some(vec!["team@x.com".into()]),
            ..Default::default()
        };
        let license = patch.merge_license(&report.license_terms()).unwrap();
        report.apply_patch(patch, &license);

        assert_eq!(report.title.as_deref(), Some("Solar Inverters 2026"));
        assert_eq!(report.single_user_price, Some(Decimal::new(4999, 0)));
        assert_eq!(report.license_type, LicenseType::Multi);
        assert_eq!(report.allowed_emails, vec!["team@x.com".to_string()]);
        assert_eq!(report.current_user_email, None);
    }

    #[test]
    fn test_license_terms_round_trip() {
        let report = stored_single();
        assert_eq!(
            report.license_terms(),
            LicenseTerms::Single {
                current_user_email: "buyer@x.com".into()
            }
        );
    }
}
