//! In-process store with the same semantics as [`super::PgStore`].

use super::{AccountStore, CatalogStore, LeadStore, PaymentStore, StoreError};
use crate::entities::accounts::{Account, AccountInsert};
use crate::entities::contacts::{ContactForm, ContactPage, SampleRequest};
use crate::entities::infographics::{Infographic, InfographicInsert};
use crate::entities::notifications::{Notification, NotificationInsert};
use crate::entities::payments::{
    LicenseAccess, PAYMENT_STATUS_VERIFIED, Payment, PaymentInsert, VerifiedPayment,
};
use crate::entities::press_releases::{PressRelease, PressReleaseInsert};
use crate::entities::reports::{Report, ReportInsert};
use crate::entities::{LicenseType, NotificationStatus, Page};
use async_trait::async_trait;
use mrportal_sdk::objects::catalog::{ListParams, SortKey, SortOrder};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    accounts: Vec<Account>,
    payments: Vec<Payment>,
    licenses: Vec<LicenseAccess>,
    reports: Vec<Report>,
    infographics: Vec<Infographic>,
    press_releases: Vec<PressRelease>,
    contact_forms: Vec<ContactForm>,
    contact_pages: Vec<ContactPage>,
    sample_requests: Vec<SampleRequest>,
    notifications: Vec<Notification>,
}

/// Store that keeps every table in memory behind one lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every payment.
    pub async fn payments(&self) -> Vec<Payment> {
        self.tables.read().await.payments.clone()
    }

    /// Snapshot of the outbox.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.tables.read().await.notifications.clone()
    }

    /// Snapshot of every sample report request.
    pub async fn sample_requests(&self) -> Vec<SampleRequest> {
        self.tables.read().await.sample_requests.clone()
    }

    pub async fn notification(&self, id: Uuid) -> Option<Notification> {
        let tables = self.tables.read().await;
        tables.notifications.iter().find(|n| n.id == id).cloned()
    }

    /// Move every outbox timestamp `by` into the past.
    pub async fn age_notifications(&self, by: time::Duration) {
        for n in self.tables.write().await.notifications.iter_mut() {
            n.created_at -= by;
            n.last_tried_at = n.last_tried_at.map(|t| t - by);
        }
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum SortValue<'a> {
    Time(OffsetDateTime),
    Text(Option<&'a str>),
    Price(Option<Decimal>),
}

trait Listed: Clone {
    fn id(&self) -> Uuid;
    fn sort_value(&self, key: SortKey) -> SortValue<'_>;
}

fn catalog_sort_value<'a>(
    key: SortKey,
    created_at: OffsetDateTime,
    title: &'a Option<String>,
    category: &'a Option<String>,
    prices: [Option<Decimal>; 3],
) -> SortValue<'a> {
    match key {
        SortKey::CreatedAt => SortValue::Time(created_at),
        SortKey::Title => SortValue::Text(title.as_deref()),
        SortKey::Category => SortValue::Text(category.as_deref()),
        SortKey::SingleUserPrice => SortValue::Price(prices[0]),
        SortKey::MultiUserPrice => SortValue::Price(prices[1]),
        SortKey::EnterprisePrice => SortValue::Price(prices[2]),
    }
}

impl Listed for Report {
    fn id(&self) -> Uuid {
        self.id
    }

    fn sort_value(&self, key: SortKey) -> SortValue<'_> {
        catalog_sort_value(
            key,
            self.created_at,
            &self.title,
            &self.category,
            [
                self.single_user_price,
                self.multi_user_price,
                self.enterprise_price,
            ],
        )
    }
}

impl Listed for Infographic {
    fn id(&self) -> Uuid {
        self.id
    }

    fn sort_value(&self, key: SortKey) -> SortValue<'_> {
        catalog_sort_value(
            key,
            self.created_at,
            &self.title,
            &self.category,
            [
                self.single_user_price,
                self.multi_user_price,
                self.enterprise_price,
            ],
        )
    }
}

impl Listed for PressRelease {
    fn id(&self) -> Uuid {
        self.id
    }

    fn sort_value(&self, key: SortKey) -> SortValue<'_> {
        catalog_sort_value(
            key,
            self.created_at,
            &self.title,
            &self.category,
            [None; 3],
        )
    }
}

/// Same ordering as the SQL listing: NULLs lowest, `id` as tie-breaker.
fn page_of<T: Listed>(rows: &[T], params: &ListParams) -> Page<T> {
    let mut sorted: Vec<&T> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        let ord = a
            .sort_value(params.sort)
            .cmp(&b.sort_value(params.sort))
            .then_with(|| a.id().cmp(&b.id()));
        match params.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    let offset = usize::try_from(params.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(params.limit).unwrap_or(0);
    Page {
        items: sorted
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect(),
        total: rows.len() as i64,
    }
}

fn oldest_first<T>(rows: &[T], key: impl Fn(&T) -> (OffsetDateTime, Uuid)) -> Vec<T>
where
    T: Clone,
{
    let mut rows = rows.to_vec();
    rows.sort_by_key(|r| key(r));
    rows
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, account: AccountInsert) -> Result<Option<Account>, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.accounts.iter().any(|a| a.email == account.email) {
            return Ok(None);
        }
        let account = Account {
            id: account.id,
            email: account.email,
            password_hash: account.password_hash,
            full_name: account.full_name,
            company_name: account.company_name,
            phone: account.phone,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.accounts.push(account.clone());
        Ok(Some(account))
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.iter().find(|a| a.email == email).cloned())
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn record_verified_payment(
        &self,
        payment: PaymentInsert,
        license_type: Option<LicenseType>,
    ) -> Result<Option<VerifiedPayment>, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.payments.iter().any(|p| p.order_id == payment.order_id) {
            return Ok(None);
        }
        let now = OffsetDateTime::now_utc();
        let payment = Payment {
            id: payment.id,
            order_id: payment.order_id,
            payment_id: payment.payment_id,
            signature: payment.signature,
            amount: payment.amount,
            currency: payment.currency,
            status: PAYMENT_STATUS_VERIFIED.to_string(),
            created_at: now,
        };
        let license = license_type.map(|license_type| LicenseAccess {
            id: Uuid::now_v7(),
            order_id: payment.order_id.clone(),
            license_type,
            access_granted: true,
            created_at: now,
        });
        tables.payments.push(payment.clone());
        if let Some(license) = &license {
            tables.licenses.push(license.clone());
        }
        Ok(Some(VerifiedPayment { payment, license }))
    }

    async fn find_payment(&self, order_id: &str) -> Result<Option<Payment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .payments
            .iter()
            .find(|p| p.order_id == order_id)
            .cloned())
    }

    async fn find_license_access(
        &self,
        order_id: &str,
    ) -> Result<Option<LicenseAccess>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .licenses
            .iter()
            .rev()
            .find(|l| l.order_id == order_id)
            .cloned())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn insert_report(&self, report: ReportInsert) -> Result<Report, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.reports.iter().any(|r| r.report_id == report.report_id) {
            return Err(StoreError::Conflict("report"));
        }
        let report = report.into_report(OffsetDateTime::now_utc());
        tables.reports.push(report.clone());
        Ok(report)
    }

    async fn get_report(&self, id: Uuid) -> Result<Option<Report>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.reports.iter().find(|r| r.id == id).cloned())
    }

    async fn find_report_by_report_id(
        &self,
        report_id: &str,
    ) -> Result<Option<Report>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .reports
            .iter()
            .find(|r| r.report_id == report_id)
            .cloned())
    }

    async fn update_report(&self, report: Report) -> Result<Option<Report>, StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .reports
            .iter()
            .any(|r| r.report_id == report.report_id && r.id != report.id)
        {
            return Err(StoreError::Conflict("report"));
        }
        let Some(slot) = tables.reports.iter_mut().find(|r| r.id == report.id) else {
            return Ok(None);
        };
        let report = Report {
            created_at: slot.created_at,
            ..report
        };
        *slot = report.clone();
        Ok(Some(report))
    }

    async fn list_reports(&self, params: ListParams) -> Result<Page<Report>, StoreError> {
        Ok(page_of(&self.tables.read().await.reports, &params))
    }

    async fn insert_infographic(
        &self,
        infographic: InfographicInsert,
    ) -> Result<Infographic, StoreError> {
        let infographic = infographic.into_infographic(OffsetDateTime::now_utc());
        self.tables
            .write()
            .await
            .infographics
            .push(infographic.clone());
        Ok(infographic)
    }

    async fn get_infographic(&self, id: Uuid) -> Result<Option<Infographic>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.infographics.iter().find(|i| i.id == id).cloned())
    }

    async fn list_infographics(
        &self,
        params: ListParams,
    ) -> Result<Page<Infographic>, StoreError> {
        Ok(page_of(&self.tables.read().await.infographics, &params))
    }

    async fn insert_press_release(
        &self,
        press_release: PressReleaseInsert,
    ) -> Result<PressRelease, StoreError> {
        let press_release = press_release.into_press_release(OffsetDateTime::now_utc());
        self.tables
            .write()
            .await
            .press_releases
            .push(press_release.clone());
        Ok(press_release)
    }

    async fn get_press_release(&self, id: Uuid) -> Result<Option<PressRelease>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.press_releases.iter().find(|p| p.id == id).cloned())
    }

    async fn update_press_release(
        &self,
        press_release: PressRelease,
    ) -> Result<Option<PressRelease>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(slot) = tables
            .press_releases
            .iter_mut()
            .find(|p| p.id == press_release.id)
        else {
            return Ok(None);
        };
        let press_release = PressRelease {
            created_at: slot.created_at,
            ..press_release
        };
        *slot = press_release.clone();
        Ok(Some(press_release))
    }

    async fn list_press_releases(
        &self,
        params: ListParams,
    ) -> Result<Page<PressRelease>, StoreError> {
        Ok(page_of(&self.tables.read().await.press_releases, &params))
    }
}

#[async_trait]
impl LeadStore for MemoryStore {
    async fn submit_contact_form(
        &self,
        form: ContactForm,
        notification: NotificationInsert,
    ) -> Result<(ContactForm, Notification), StoreError> {
        let notification = notification.into_notification(OffsetDateTime::now_utc());
        let mut tables = self.tables.write().await;
        tables.contact_forms.push(form.clone());
        tables.notifications.push(notification.clone());
        Ok((form, notification))
    }

    async fn list_contact_forms(&self) -> Result<Vec<ContactForm>, StoreError> {
        let tables = self.tables.read().await;
        Ok(oldest_first(&tables.contact_forms, |f| (f.created_at, f.id)))
    }

    async fn submit_contact_page(
        &self,
        page: ContactPage,
        notification: NotificationInsert,
    ) -> Result<(ContactPage, Notification), StoreError> {
        let notification = notification.into_notification(OffsetDateTime::now_utc());
        let mut tables = self.tables.write().await;
        tables.contact_pages.push(page.clone());
        tables.notifications.push(notification.clone());
        Ok((page, notification))
    }

    async fn list_contact_pages(&self) -> Result<Vec<ContactPage>, StoreError> {
        let tables = self.tables.read().await;
        Ok(oldest_first(&tables.contact_pages, |p| (p.created_at, p.id)))
    }

    async fn submit_sample_request(
        &self,
        request: SampleRequest,
        notification: NotificationInsert,
    ) -> Result<(SampleRequest, Notification), StoreError> {
        let notification = notification.into_notification(OffsetDateTime::now_utc());
        let mut tables = self.tables.write().await;
        tables.sample_requests.push(request.clone());
        tables.notifications.push(notification.clone());
        Ok((request, notification))
    }

    async fn mark_notification_sent(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(n) = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.status == NotificationStatus::Pending)
        {
            n.status = NotificationStatus::Sent;
            n.attempts += 1;
            n.last_tried_at = Some(OffsetDateTime::now_utc());
            n.last_error = None;
        }
        Ok(())
    }

    async fn record_notification_failure(
        &self,
        id: Uuid,
        error: String,
        max_attempts: i32,
    ) -> Result<Option<NotificationStatus>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(n) = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.status == NotificationStatus::Pending)
        else {
            return Ok(None);
        };
        n.attempts += 1;
        n.last_error = Some(error);
        n.last_tried_at = Some(OffsetDateTime::now_utc());
        if n.attempts >= max_attempts {
            n.status = NotificationStatus::Failed;
        }
        Ok(Some(n.status))
    }

    async fn due_notifications(&self, limit: i64) -> Result<Vec<Notification>, StoreError> {
        let now = OffsetDateTime::now_utc();
        let tables = self.tables.read().await;
        let mut due: Vec<Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|n| (n.created_at, n.id));
        due.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::notifications::NotificationKind;
    use mrportal_sdk::objects::Validate;
    use mrportal_sdk::objects::catalog::{PressReleaseForm, ReportForm};

    async fn seed_reports(store: &MemoryStore, n: usize) {
        for i in 0..n {
            let draft = ReportForm {
                title: Some(format!("Report {i:02}")),
                single_user_price: (i % 3 != 0).then(|| format!("{}", 100 + i)),
                ..Default::default()
            }
            .validate()
            .unwrap();
            store
                .insert_report(ReportInsert {
                    id: Uuid::now_v7(),
                    report_id: format!("RPT-{i:02}"),
                    draft,
                    file_path: None,
                    access_token: "t".into(),
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_second_page_holds_records_eleven_to_twenty() {
        let store = MemoryStore::new();
        seed_reports(&store, 25).await;
        let page = store
            .list_reports(ListParams {
                page: 2,
                limit: 10,
                sort: SortKey::Title,
                order: SortOrder::Asc,
            })
            .await
            .unwrap();
        assert_eq!(page.total, 25);
        let titles: Vec<_> = page.items.iter().filter_map(|r| r.title.clone()).collect();
        let expected: Vec<_> = (10..20).map(|i| format!("Report {i:02}")).collect();
        assert_eq!(titles, expected);
    }

    #[tokio::test]
    async fn test_missing_prices_sort_lowest() {
        let store = MemoryStore::new();
        seed_reports(&store, 6).await;
        let asc = store
            .list_reports(ListParams {
                sort: SortKey::SingleUserPrice,
                order: SortOrder::Asc,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(asc.items[0].single_user_price.is_none());
        assert!(asc.items[1].single_user_price.is_none());
        let desc = store
            .list_reports(ListParams {
                sort: SortKey::SingleUserPrice,
                order: SortOrder::Desc,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(desc.items[0].single_user_price, Some(Decimal::from(105)));
        assert!(desc.items[5].single_user_price.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_order_is_not_recorded_twice() {
        let store = MemoryStore::new();
        let insert = PaymentInsert {
            id: Uuid::now_v7(),
            order_id: "order_1".into(),
            payment_id: "pay_1".into(),
            signature: "sig".into(),
            amount: 50_000,
            currency: "INR".into(),
        };
        let first = store
            .record_verified_payment(insert.clone(), Some(LicenseType::Single))
            .await
            .unwrap();
        assert!(first.unwrap().license.is_some());
        let second = store
            .record_verified_payment(insert, Some(LicenseType::Single))
            .await
            .unwrap();
        assert!(second.is_none());
        assert_eq!(store.payments().await.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_report_id_conflicts() {
        let store = MemoryStore::new();
        seed_reports(&store, 1).await;
        let draft = ReportForm::default().validate().unwrap();
        let err = store
            .insert_report(ReportInsert {
                id: Uuid::now_v7(),
                report_id: "RPT-00".into(),
                draft,
                file_path: None,
                access_token: "t".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_press_release_keeps_creation_time() {
        let store = MemoryStore::new();
        let created = store
            .insert_press_release(PressReleaseInsert {
                id: Uuid::now_v7(),
                form: PressReleaseForm::default(),
                file_path: None,
            })
            .await
            .unwrap();
        let mut changed = created.clone();
        changed.title = Some("New".into());
        changed.created_at = OffsetDateTime::UNIX_EPOCH;
        let updated = store.update_press_release(changed).await.unwrap().unwrap();
        assert_eq!(updated.created_at, created.created_at);
        assert!(
            store
                .update_press_release(PressRelease {
                    id: Uuid::now_v7(),
                    ..updated
                })
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_failures_exhaust_into_failed() {
        let store = MemoryStore::new();
        let form_id = Uuid::now_v7();
        let (_, n) = store
            .submit_contact_page(
                ContactPage::new(form_id, Default::default(), OffsetDateTime::now_utc()),
                NotificationInsert {
                    id: Uuid::now_v7(),
                    kind: NotificationKind::ContactPage,
                    subject_id: form_id,
                    recipient: "inbox@x.com".into(),
                    subject: "s".into(),
                    html_body: Some("<p>h</p>".into()),
                    text_body: None,
                },
            )
            .await
            .unwrap();
        let first = store
            .record_notification_failure(n.id, "timeout".into(), 2)
            .await
            .unwrap();
        assert_eq!(first, Some(NotificationStatus::Pending));
        let second = store
            .record_notification_failure(n.id, "timeout".into(), 2)
            .await
            .unwrap();
        assert_eq!(second, Some(NotificationStatus::Failed));
        let third = store
            .record_notification_failure(n.id, "timeout".into(), 2)
            .await
            .unwrap();
        assert_eq!(third, None);
    }
}
