//! Notification outbox.
//!
//! Every form submission writes its e-mail into this table in the same
//! transaction as the submission itself. Delivery is attempted right away
//! and retried by the `NotificationRetrier` with exponential backoff until
//! [`MAX_NOTIFICATION_ATTEMPTS`] is reached.

use crate::entities::NotificationStatus;
use crate::framework::{DatabaseAccessor, DatabaseProcessor};
use kanau::processor::Processor;
use std::time::Duration;
use time::OffsetDateTime;
use uuid::Uuid;

/// Attempts after which a notification is marked failed.
pub const MAX_NOTIFICATION_ATTEMPTS: i32 = 8;

/// Backoff exponent cap (2^11 = 2048 seconds).
const MAX_BACKOFF_EXPONENT: u32 = 11;

/// How long a never-attempted notification is left to its inline send
/// before the retrier takes it over.
pub const UNATTEMPTED_GRACE: Duration = Duration::from_secs(60);

const NOTIFICATION_COLUMNS: &str = "id, kind, subject_id, recipient, subject, html_body, \
    text_body, status, attempts, last_error, last_tried_at, created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "notification_kind")]
pub enum NotificationKind {
    ContactForm,
    ContactPage,
    SampleRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    /// Id of the submission this notification belongs to.
    pub subject_id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub status: NotificationStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub last_tried_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

/// Delay before the next attempt after `attempts` failed ones: 2^attempts
/// seconds.
pub fn retry_delay(attempts: u32) -> Duration {
    Duration::from_secs(2u64.pow(attempts.min(MAX_BACKOFF_EXPONENT)))
}

impl Notification {
    /// Whether the retrier should attempt this notification at `now`.
    pub fn is_due(&self, now: OffsetDateTime) -> bool {
        if self.status != NotificationStatus::Pending {
            return false;
        }
        match (self.attempts, self.last_tried_at) {
            (0, _) | (_, None) => self.created_at + UNATTEMPTED_GRACE <= now,
            (attempts, Some(last_tried_at)) => {
                last_tried_at + retry_delay(attempts.unsigned_abs()) <= now
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationInsert {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub subject_id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
}

impl NotificationInsert {
    pub fn into_notification(self, created_at: OffsetDateTime) -> Notification {
        Notification {
            id: self.id,
            kind: self.kind,
            subject_id: self.subject_id,
            recipient: self.recipient,
            subject: self.subject,
            html_body: self.html_body,
            text_body: self.text_body,
            status: NotificationStatus::Pending,
            attempts: 0,
            last_error: None,
            last_tried_at: None,
            created_at,
        }
    }
}

impl Notification {
    /// Queue a notification as part of a submission's transaction.
    pub async fn insert_tx(
        db: &mut impl DatabaseAccessor,
        insert: NotificationInsert,
    ) -> Result<Notification, sqlx::Error> {
        sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO notifications (id, kind, subject_id, recipient, subject, html_body, text_body)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(insert.id)
        .bind(insert.kind)
        .bind(insert.subject_id)
        .bind(insert.recipient)
        .bind(insert.subject)
        .bind(insert.html_body)
        .bind(insert.text_body)
        .fetch_one(db.acquire())
        .await
    }
}

#[derive(Debug, Clone)]
pub struct MarkNotificationSent {
    pub id: Uuid,
}

impl Processor<MarkNotificationSent> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:MarkNotificationSent")]
    async fn process(&self, cmd: MarkNotificationSent) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE notifications
            SET status = 'sent', attempts = attempts + 1, last_tried_at = NOW(), last_error = NULL
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(cmd.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Record a failed delivery attempt.
///
/// The notification is marked failed once its attempts reach
/// `max_attempts`. Returns the resulting status, or `None` when the row is
/// no longer pending.
#[derive(Debug, Clone)]
pub struct RecordNotificationFailure {
    pub id: Uuid,
    pub error: String,
    pub max_attempts: i32,
}

impl Processor<RecordNotificationFailure> for DatabaseProcessor {
    type Output = Option<NotificationStatus>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:RecordNotificationFailure")]
    async fn process(
        &self,
        cmd: RecordNotificationFailure,
    ) -> Result<Option<NotificationStatus>, sqlx::Error> {
        sqlx::query_scalar::<_, NotificationStatus>(
            r#"
            UPDATE notifications
            SET attempts = attempts + 1,
                last_error = $2,
                last_tried_at = NOW(),
                status = CASE
                    WHEN attempts + 1 >= $3 THEN 'failed'::notification_status
                    ELSE 'pending'::notification_status
                END
            WHERE id = $1 AND status = 'pending'
            RETURNING status
            "#,
        )
        .bind(cmd.id)
        .bind(cmd.error)
        .bind(cmd.max_attempts)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Pending notifications whose backoff has elapsed, oldest first.
#[derive(Debug, Clone)]
pub struct GetDueNotifications {
    pub limit: i64,
}

impl Processor<GetDueNotifications> for DatabaseProcessor {
    type Output = Vec<Notification>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetDueNotifications")]
    async fn process(&self, query: GetDueNotifications) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE status = 'pending'
              AND (
                ((attempts = 0 OR last_tried_at IS NULL)
                    AND created_at <= NOW() - make_interval(secs => $2))
                OR (attempts > 0 AND last_tried_at
                    + make_interval(secs => power(2, LEAST(attempts, $3))) <= NOW())
              )
            ORDER BY created_at ASC
            LIMIT $1
            "#
        ))
        .bind(query.limit)
        .bind(UNATTEMPTED_GRACE.as_secs_f64())
        .bind(MAX_BACKOFF_EXPONENT as i32)
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(attempts: i32, last_tried_secs_ago: Option<i64>) -> Notification {
        let now = OffsetDateTime::now_utc();
        Notification {
            id: Uuid::now_v7(),
            kind: NotificationKind::ContactForm,
            subject_id: Uuid::now_v7(),
            recipient: "inbox@x.com".into(),
            subject: "s".into(),
            html_body: None,
            text_body: Some("t".into()),
            status: NotificationStatus::Pending,
            attempts,
            last_error: None,
            last_tried_at: last_tried_secs_ago.map(|s| now - time::Duration::seconds(s)),
            created_at: now - time::Duration::seconds(600),
        }
    }

    #[test]
    fn test_retry_delay_calculation() {
        assert_eq!(retry_delay(0), Duration::from_secs(1));
        assert_eq!(retry_delay(1), Duration::from_secs(2));
        assert_eq!(retry_delay(3), Duration::from_secs(8));
        assert_eq!(retry_delay(11), Duration::from_secs(2048));
        // Max capped at 11
        assert_eq!(retry_delay(40), Duration::from_secs(2048));
    }

    #[test]
    fn test_due_after_backoff() {
        let now = OffsetDateTime::now_utc();
        assert!(pending(1, Some(3)).is_due(now));
        assert!(!pending(3, Some(3)).is_due(now));
        assert!(pending(3, Some(9)).is_due(now));
    }

    #[test]
    fn test_unattempted_waits_for_grace() {
        let now = OffsetDateTime::now_utc();
        let mut fresh = pending(0, None);
        fresh.created_at = now;
        assert!(!fresh.is_due(now));
        assert!(pending(0, None).is_due(now));
    }

    #[test]
    fn test_settled_notifications_are_never_due() {
        let now = OffsetDateTime::now_utc();
        let mut sent = pending(1, Some(100));
        sent.status = NotificationStatus::Sent;
        assert!(!sent.is_due(now));
    }
}
