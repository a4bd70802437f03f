use crate::entities::LicenseType;
use crate::framework::{DatabaseAccessor, DatabaseProcessor};
use kanau::processor::Processor;
use mrportal_sdk::objects::payment::{LicenseAccessResponse, PaymentResponse};
use time::OffsetDateTime;
use uuid::Uuid;

/// Status stored on every payment row; only verified payments are persisted.
pub const PAYMENT_STATUS_VERIFIED: &str = "verified";

/// A payment whose gateway signature was verified.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    /// Gateway order id, unique.
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    /// Minor currency units.
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub created_at: OffsetDateTime,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        PaymentResponse {
            order_id: payment.order_id,
            payment_id: payment.payment_id,
            amount: u64::try_from(payment.amount).unwrap_or_default(),
            currency: payment.currency,
            status: payment.status,
            created_at: payment.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInsert {
    pub id: Uuid,
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub amount: i64,
    pub currency: String,
}

/// License granted by a paid order.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LicenseAccess {
    pub id: Uuid,
    pub order_id: String,
    pub license_type: LicenseType,
    pub access_granted: bool,
    pub created_at: OffsetDateTime,
}

impl From<LicenseAccess> for LicenseAccessResponse {
    fn from(access: LicenseAccess) -> Self {
        LicenseAccessResponse {
            order_id: access.order_id,
            license_type: access.license_type.into(),
            access_granted: access.access_granted,
            created_at: access.created_at,
        }
    }
}

/// A payment together with the license it granted, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayment {
    pub payment: Payment,
    pub license: Option<LicenseAccess>,
}

impl Payment {
    /// Insert a verified payment unless its order was already recorded.
    ///
    /// Returns `None` for an order id that already has a payment.
    pub async fn insert_verified_tx(
        db: &mut impl DatabaseAccessor,
        insert: PaymentInsert,
    ) -> Result<Option<Payment>, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (id, order_id, payment_id, signature, amount, currency, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (order_id) DO NOTHING
            RETURNING id, order_id, payment_id, signature, amount, currency, status, created_at
            "#,
        )
        .bind(insert.id)
        .bind(insert.order_id)
        .bind(insert.payment_id)
        .bind(insert.signature)
        .bind(insert.amount)
        .bind(insert.currency)
        .bind(PAYMENT_STATUS_VERIFIED)
        .fetch_optional(db.acquire())
        .await
    }
}

impl LicenseAccess {
    /// Grant `license_type` to the buyer of `order_id`.
    pub async fn grant_tx(
        db: &mut impl DatabaseAccessor,
        order_id: &str,
        license_type: LicenseType,
    ) -> Result<LicenseAccess, sqlx::Error> {
        sqlx::query_as::<_, LicenseAccess>(
            r#"
            INSERT INTO license_access (id, order_id, license_type, access_granted)
            VALUES ($1, $2, $3, TRUE)
            RETURNING id, order_id, license_type, access_granted, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(order_id)
        .bind(license_type)
        .fetch_one(db.acquire())
        .await
    }
}

/// Persist a verified payment and, when a license type is given, its
/// license grant. Both rows are written in one transaction.
///
/// Returns `None` when the order already has a payment; nothing is written
/// in that case.
#[derive(Debug, Clone)]
pub struct RecordVerifiedPayment {
    pub payment: PaymentInsert,
    pub license_type: Option<LicenseType>,
}

impl Processor<RecordVerifiedPayment> for DatabaseProcessor {
    type Output = Option<VerifiedPayment>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:RecordVerifiedPayment")]
    async fn process(
        &self,
        cmd: RecordVerifiedPayment,
    ) -> Result<Option<VerifiedPayment>, sqlx::Error> {
        let mut tx = self.begin().await?;
        let Some(payment) = Payment::insert_verified_tx(&mut tx, cmd.payment).await? else {
            return Ok(None);
        };
        let license = match cmd.license_type {
            Some(license_type) => {
                Some(LicenseAccess::grant_tx(&mut tx, &payment.order_id, license_type).await?)
            }
            None => None,
        };
        tx.commit().await?;
        Ok(Some(VerifiedPayment { payment, license }))
    }
}

#[derive(Debug, Clone)]
pub struct GetPaymentByOrderId {
    pub order_id: String,
}

impl Processor<GetPaymentByOrderId> for DatabaseProcessor {
    type Output = Option<Payment>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetPaymentByOrderId")]
    async fn process(&self, query: GetPaymentByOrderId) -> Result<Option<Payment>, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, order_id, payment_id, signature, amount, currency, status, created_at
            FROM payments
            WHERE order_id = $1
            "#,
        )
        .bind(query.order_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetLicenseAccess {
    pub order_id: String,
}

impl Processor<GetLicenseAccess> for DatabaseProcessor {
    type Output = Option<LicenseAccess>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetLicenseAccess")]
    async fn process(&self, query: GetLicenseAccess) -> Result<Option<LicenseAccess>, sqlx::Error> {
        sqlx::query_as::<_, LicenseAccess>(
            r#"
            SELECT id, order_id, license_type, access_granted, created_at
            FROM license_access
            WHERE order_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(query.order_id)
        .fetch_optional(&self.pool)
        .await
    }
}
