use super::{AccountStore, CatalogStore, LeadStore, PaymentStore, StoreError};
use crate::entities::accounts::{Account, AccountInsert, GetAccountByEmail, InsertAccount};
use crate::entities::contacts::{
    ContactForm, ContactPage, ListContactForms, ListContactPages, SampleRequest,
    SubmitContactForm, SubmitContactPage, SubmitSampleRequest,
};
use crate::entities::infographics::{
    GetInfographic, Infographic, InfographicInsert, InsertInfographic, ListInfographics,
};
use crate::entities::notifications::{
    GetDueNotifications, MarkNotificationSent, Notification,
    NotificationInsert, RecordNotificationFailure,
};
use crate::entities::payments::{
    GetLicenseAccess, GetPaymentByOrderId, LicenseAccess, Payment, PaymentInsert,
    RecordVerifiedPayment, VerifiedPayment,
};
use crate::entities::press_releases::{
    GetPressRelease, InsertPressRelease, ListPressReleases, PressRelease, PressReleaseInsert,
    UpdatePressRelease,
};
use crate::entities::reports::{
    GetReport, GetReportByReportId, InsertReport, ListReports, Report, ReportInsert,
    UpdateReport,
};
use crate::entities::{LicenseType, NotificationStatus, Page};
use crate::framework::DatabaseProcessor;
use async_trait::async_trait;
use kanau::processor::Processor;
use mrportal_sdk::objects::catalog::ListParams;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    db: DatabaseProcessor,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            db: DatabaseProcessor { pool },
        }
    }
}

fn report_id_conflict(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict("report"),
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create_account(&self, account: AccountInsert) -> Result<Option<Account>, StoreError> {
        Ok(self.db.process(InsertAccount { account }).await?)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .db
            .process(GetAccountByEmail {
                email: email.to_string(),
            })
            .await?)
    }
}

#[async_trait]
impl PaymentStore for PgStore {
    async fn record_verified_payment(
        &self,
        payment: PaymentInsert,
        license_type: Option<LicenseType>,
    ) -> Result<Option<VerifiedPayment>, StoreError> {
        Ok(self
            .db
            .process(RecordVerifiedPayment {
                payment,
                license_type,
            })
            .await?)
    }

    async fn find_payment(&self, order_id: &str) -> Result<Option<Payment>, StoreError> {
        Ok(self
            .db
            .process(GetPaymentByOrderId {
                order_id: order_id.to_string(),
            })
            .await?)
    }

    async fn find_license_access(
        &self,
        order_id: &str,
    ) -> Result<Option<LicenseAccess>, StoreError> {
        Ok(self
            .db
            .process(GetLicenseAccess {
                order_id: order_id.to_string(),
            })
            .await?)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn insert_report(&self, report: ReportInsert) -> Result<Report, StoreError> {
        self.db
            .process(InsertReport { report })
            .await
            .map_err(report_id_conflict)?
            .ok_or(StoreError::Conflict("report"))
    }

    async fn get_report(&self, id: Uuid) -> Result<Option<Report>, StoreError> {
        Ok(self.db.process(GetReport { id }).await?)
    }

    async fn find_report_by_report_id(
        &self,
        report_id: &str,
    ) -> Result<Option<Report>, StoreError> {
        Ok(self
            .db
            .process(GetReportByReportId {
                report_id: report_id.to_string(),
            })
            .await?)
    }

    async fn update_report(&self, report: Report) -> Result<Option<Report>, StoreError> {
        self.db
            .process(UpdateReport { report })
            .await
            .map_err(report_id_conflict)
    }

    async fn list_reports(&self, params: ListParams) -> Result<Page<Report>, StoreError> {
        Ok(self.db.process(ListReports { params }).await?)
    }

    async fn insert_infographic(
        &self,
        infographic: InfographicInsert,
    ) -> Result<Infographic, StoreError> {
        Ok(self.db.process(InsertInfographic { infographic }).await?)
    }

    async fn get_infographic(&self, id: Uuid) -> Result<Option<Infographic>, StoreError> {
        Ok(self.db.process(GetInfographic { id }).await?)
    }

    async fn list_infographics(
        &self,
        params: ListParams,
    ) -> Result<Page<Infographic>, StoreError> {
        Ok(self.db.process(ListInfographics { params }).await?)
    }

    async fn insert_press_release(
        &self,
        press_release: PressReleaseInsert,
    ) -> Result<PressRelease, StoreError> {
        Ok(self.db.process(InsertPressRelease { press_release }).await?)
    }

    async fn get_press_release(&self, id: Uuid) -> Result<Option<PressRelease>, StoreError> {
        Ok(self.db.process(GetPressRelease { id }).await?)
    }

    async fn update_press_release(
        &self,
        press_release: PressRelease,
    ) -> Result<Option<PressRelease>, StoreError> {
        Ok(self.db.process(UpdatePressRelease { press_release }).await?)
    }

    async fn list_press_releases(
        &self,
        params: ListParams,
    ) -> Result<Page<PressRelease>, StoreError> {
        Ok(self.db.process(ListPressReleases { params }).await?)
    }
}

#[async_trait]
impl LeadStore for PgStore {
    async fn submit_contact_form(
        &self,
        form: ContactForm,
        notification: NotificationInsert,
    ) -> Result<(ContactForm, Notification), StoreError> {
        Ok(self
            .db
            .process(SubmitContactForm { form, notification })
            .await?)
    }

    async fn list_contact_forms(&self) -> Result<Vec<ContactForm>, StoreError> {
        Ok(self.db.process(ListContactForms).await?)
    }

    async fn submit_contact_page(
        &self,
        page: ContactPage,
        notification: NotificationInsert,
    ) -> Result<(ContactPage, Notification), StoreError> {
        Ok(self
            .db
            .process(SubmitContactPage { page, notification })
            .await?)
    }

    async fn list_contact_pages(&self) -> Result<Vec<ContactPage>, StoreError> {
        Ok(self.db.process(ListContactPages).await?)
    }

    async fn submit_sample_request(
        &self,
        request: SampleRequest,
        notification: NotificationInsert,
    ) -> Result<(SampleRequest, Notification), StoreError> {
        Ok(self
            .db
            .process(SubmitSampleRequest {
                request,
                notification,
            })
            .await?)
    }

    async fn mark_notification_sent(&self, id: Uuid) -> Result<(), StoreError> {
        Ok(self.db.process(MarkNotificationSent { id }).await?)
    }

    async fn record_notification_failure(
        &self,
        id: Uuid,
        error: String,
        max_attempts: i32,
    ) -> Result<Option<NotificationStatus>, StoreError> {
        Ok(self
            .db
            .process(RecordNotificationFailure {
                id,
                error,
                max_attempts,
            })
            .await?)
    }

    async fn due_notifications(&self, limit: i64) -> Result<Vec<Notification>, StoreError> {
        Ok(self.db.process(GetDueNotifications { limit }).await?)
    }
}
