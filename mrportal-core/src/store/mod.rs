//! Persistence seams used by the HTTP layer.
//!
//! [`PgStore`] runs the database commands in [`crate::entities`];
//! [`MemoryStore`] keeps everything in process and backs the router tests.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::entities::LicenseType;
use crate::entities::NotificationStatus;
use crate::entities::Page;
use crate::entities::accounts::{Account, AccountInsert};
use crate::entities::contacts::{ContactForm, ContactPage, SampleRequest};
use crate::entities::infographics::{Infographic, InfographicInsert};
use crate::entities::notifications::{Notification, NotificationInsert};
use crate::entities::payments::{LicenseAccess, Payment, PaymentInsert, VerifiedPayment};
use crate::entities::press_releases::{PressRelease, PressReleaseInsert};
use crate::entities::reports::{Report, ReportInsert};
use async_trait::async_trait;
use mrportal_sdk::objects::catalog::ListParams;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique key is already taken.
    #[error("{0} already exists")]
    Conflict(&'static str),
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Returns `None` when the email is already registered.
    async fn create_account(&self, account: AccountInsert) -> Result<Option<Account>, StoreError>;
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Persist a verified payment and its optional license grant atomically.
    ///
    /// Returns `None` when the order already has a payment.
    async fn record_verified_payment(
        &self,
        payment: PaymentInsert,
        license_type: Option<LicenseType>,
    ) -> Result<Option<VerifiedPayment>, StoreError>;
    async fn find_payment(&self, order_id: &str) -> Result<Option<Payment>, StoreError>;
    async fn find_license_access(&self, order_id: &str)
    -> Result<Option<LicenseAccess>, StoreError>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when `report_id` is taken.
    async fn insert_report(&self, report: ReportInsert) -> Result<Report, StoreError>;
    async fn get_report(&self, id: Uuid) -> Result<Option<Report>, StoreError>;
    async fn find_report_by_report_id(&self, report_id: &str)
    -> Result<Option<Report>, StoreError>;
    /// Write back a merged report. `None` when it no longer exists.
    async fn update_report(&self, report: Report) -> Result<Option<Report>, StoreError>;
    async fn list_reports(&self, params: ListParams) -> Result<Page<Report>, StoreError>;

    async fn insert_infographic(
        &self,
        infographic: InfographicInsert,
    ) -> Result<Infographic, StoreError>;
    async fn get_infographic(&self, id: Uuid) -> Result<Option<Infographic>, StoreError>;
    async fn list_infographics(&self, params: ListParams)
    -> Result<Page<Infographic>, StoreError>;

    async fn insert_press_release(
        &self,
        press_release: PressReleaseInsert,
    ) -> Result<PressRelease, StoreError>;
    async fn get_press_release(&self, id: Uuid) -> Result<Option<PressRelease>, StoreError>;
    async fn update_press_release(
        &self,
        press_release: PressRelease,
    ) -> Result<Option<PressRelease>, StoreError>;
    async fn list_press_releases(
        &self,
        params: ListParams,
    ) -> Result<Page<PressRelease>, StoreError>;
}

#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn submit_contact_form(
        &self,
        form: ContactForm,
        notification: NotificationInsert,
    ) -> Result<(ContactForm, Notification), StoreError>;
    async fn list_contact_forms(&self) -> Result<Vec<ContactForm>, StoreError>;

    async fn submit_contact_page(
        &self,
        page: ContactPage,
        notification: NotificationInsert,
    ) -> Result<(ContactPage, Notification), StoreError>;
    async fn list_contact_pages(&self) -> Result<Vec<ContactPage>, StoreError>;

    async fn submit_sample_request(
        &self,
        request: SampleRequest,
        notification: NotificationInsert,
    ) -> Result<(SampleRequest, Notification), StoreError>;

    async fn mark_notification_sent(&self, id: Uuid) -> Result<(), StoreError>;
    /// Returns the status after the failure, `None` if the row was not pending.
    async fn record_notification_failure(
        &self,
        id: Uuid,
        error: String,
        max_attempts: i32,
    ) -> Result<Option<NotificationStatus>, StoreError>;
    async fn due_notifications(&self, limit: i64) -> Result<Vec<Notification>, StoreError>;
}
