//! Notifier.
//!
//! Hands an outbox notification to the mail relay and records the outcome.
//! A failed attempt leaves the notification pending for the
//! `NotificationRetrier`, or marks it failed once it has used up
//! [`MAX_NOTIFICATION_ATTEMPTS`].

use crate::entities::NotificationStatus;
use crate::entities::notifications::{MAX_NOTIFICATION_ATTEMPTS, Notification};
use crate::mail::{MailRelay, OutgoingMail};
use crate::store::LeadStore;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct Notifier {
    leads: Arc<dyn LeadStore>,
    mailer: Arc<dyn MailRelay>,
    from: String,
}

impl Notifier {
    pub fn new(leads: Arc<dyn LeadStore>, mailer: Arc<dyn MailRelay>, from: String) -> Self {
        Self {
            leads,
            mailer,
            from,
        }
    }

    /// Attempt delivery once and return the resulting status.
    ///
    /// Store errors while recording the outcome are logged; the notification
    /// is then reported as still pending.
    pub async fn deliver(&self, notification: &Notification) -> NotificationStatus {
        let mail = OutgoingMail::from_notification(notification, &self.from);
        match self.mailer.send(&mail).await {
            Ok(()) => match self.leads.mark_notification_sent(notification.id).await {
                Ok(()) => {
                    info!(
                        notification_id = %notification.id,
                        kind = ?notification.kind,
                        "Notification delivered"
                    );
                    NotificationStatus::Sent
                }
                Err(e) => {
                    error!(
                        notification_id = %notification.id,
                        error = %e,
                        "Notification delivered but could not be marked sent"
                    );
                    NotificationStatus::Pending
                }
            },
            Err(send_error) => {
                warn!(
                    notification_id = %notification.id,
                    error = %send_error,
                    attempts = notification.attempts + 1,
                    "Notification delivery failed"
                );
                match self
                    .leads
                    .record_notification_failure(
                        notification.id,
                        send_error.to_string(),
                        MAX_NOTIFICATION_ATTEMPTS,
                    )
                    .await
                {
                    Ok(Some(NotificationStatus::Failed)) => {
                        error!(
                            notification_id = %notification.id,
                            "Notification abandoned after maximum attempts"
                        );
                        NotificationStatus::Failed
                    }
                    Ok(Some(status)) => status,
                    Ok(None) => NotificationStatus::Pending,
                    Err(e) => {
                        error!(
                            notification_id = %notification.id,
                            error = %e,
                            "Failed to record notification failure"
                        );
                        NotificationStatus::Pending
                    }
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::entities::contacts::ContactPage;
    use crate::entities::notifications::NotificationKind;
    use crate::entities::notifications::NotificationInsert;
    use crate::mail::MailError;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use time::OffsetDateTime;
    use uuid::Uuid;

    /// Mail relay that records messages and can be switched to failing.
    #[derive(Default)]
    pub(crate) struct RecordingRelay {
        pub failing: AtomicBool,
        pub sent: AtomicUsize,
        pub attempts: AtomicUsize,
    }

    #[async_trait]
    impl MailRelay for RecordingRelay {
        async fn send(&self, _mail: &OutgoingMail) -> Result<(), MailError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                Err(MailError::Timeout)
            } else {
                self.sent.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }
    }

    pub(crate) async fn queue_one(store: &MemoryStore) -> Notification {
        let id = Uuid::now_v7();
        let (_, notification) = store
            .submit_contact_page(
                ContactPage::new(id, Default::default(), OffsetDateTime::now_utc()),
                NotificationInsert {
                    id: Uuid::now_v7(),
                    kind: NotificationKind::ContactPage,
                    subject_id: id,
                    recipient: "inbox@x.com".into(),
                    subject: "s".into(),
                    html_body: Some("<p>x</p>".into()),
                    text_body: None,
                },
            )
            .await
            .unwrap();
        notification
    }

    #[tokio::test]
    async fn test_successful_delivery_marks_sent() {
        let store = Arc::new(MemoryStore::new());
        let relay = Arc::new(RecordingRelay::default());
        let notifier = Notifier::new(store.clone(), relay.clone(), "noreply@x.com".into());
        let n = queue_one(&store).await;

        assert_eq!(notifier.deliver(&n).await, NotificationStatus::Sent);
        let stored = store.notification(n.id).await.unwrap();
        assert_eq!(stored.status, NotificationStatus::Sent);
        assert_eq!(stored.attempts, 1);
    }

    #[tokio::test]
    async fn test_failed_delivery_stays_pending() {
        let store = Arc::new(MemoryStore::new());
        let relay = Arc::new(RecordingRelay::default());
        relay.failing.store(true, Ordering::SeqCst);
        let notifier = Notifier::new(store.clone(), relay.clone(), "noreply@x.com".into());
        let n = queue_one(&store).await;

        assert_eq!(notifier.deliver(&n).await, NotificationStatus::Pending);
        let stored = store.notification(n.id).await.unwrap();
        assert_eq!(stored.attempts, 1);
        assert_eq!(stored.last_error.as_deref(), Some("mail relay timed out"));
    }
}
