//! NotificationRetrier processor.
//!
//! The NotificationRetrier is responsible for:
//! - Polling the outbox for pending notifications whose backoff elapsed
//! - Handing each one to the `Notifier` for another attempt
//! - Stopping when the shutdown signal fires

use crate::processors::Notifier;
use crate::store::{LeadStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// How often the outbox is polled.
const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Notifications handled per poll.
const BATCH_SIZE: i64 = 10;

pub struct NotificationRetrier {
    leads: Arc<dyn LeadStore>,
    notifier: Notifier,
    shutdown_rx: watch::Receiver<bool>,
}

impl NotificationRetrier {
    /// Create a new NotificationRetrier.
    ///
    /// # Arguments
    ///
    /// * `leads` - Store holding the outbox
    /// * `notifier` - Delivers a single notification
    /// * `shutdown_rx` - Receiver for shutdown signal
    pub fn new(
        leads: Arc<dyn LeadStore>,
        notifier: Notifier,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            leads,
            notifier,
            shutdown_rx,
        }
    }

    /// Run the retry loop until shutdown.
    pub async fn run(mut self) {
        info!("Notification retry loop started");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("Notification retry loop shutting down");
                        break;
                    }
                }

                _ = tokio::time::sleep(POLL_INTERVAL) => {
                    if let Err(e) = self.retry_due().await {
                        error!(error = %e, "Failed to retry notifications");
                    }
                }
            }
        }
    }

    /// Attempt every due notification once. Returns how many were tried.
    pub async fn retry_due(&self) -> Result<usize, StoreError> {
        let due = self.leads.due_notifications(BATCH_SIZE).await?;
        for notification in &due {
            let status = self.notifier.deliver(notification).await;
            debug!(
                notification_id = %notification.id,
                status = ?status,
                "Notification retried"
            );
        }
        Ok(due.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NotificationStatus;
    use crate::entities::notifications::MAX_NOTIFICATION_ATTEMPTS;
    use crate::processors::notifier::tests::{RecordingRelay, queue_one};
    use crate::store::MemoryStore;
    use std::sync::atomic::Ordering;

    fn retrier(
        store: &Arc<MemoryStore>,
        relay: &Arc<RecordingRelay>,
    ) -> (NotificationRetrier, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        let notifier = Notifier::new(store.clone(), relay.clone(), "noreply@x.com".into());
        (NotificationRetrier::new(store.clone(), notifier, rx), tx)
    }

    #[tokio::test]
    async fn test_pending_notification_is_resent_after_backoff() {
        let store = Arc::new(MemoryStore::new());
        let relay = Arc::new(RecordingRelay::default());
        let (retrier, _tx) = retrier(&store, &relay);

        relay.failing.store(true, Ordering::SeqCst);
        let n = queue_one(&store).await;
        retrier.notifier.deliver(&n).await;

        // backoff after one failure is 2s; nothing is due yet
        assert_eq!(retrier.retry_due().await.unwrap(), 0);

        relay.failing.store(false, Ordering::SeqCst);
        store.age_notifications(time::Duration::seconds(5)).await;
        assert_eq!(retrier.retry_due().await.unwrap(), 1);

        let stored = store.notification(n.id).await.unwrap();
        assert_eq!(stored.status, NotificationStatus::Sent);
        assert_eq!(relay.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let store = Arc::new(MemoryStore::new());
        let relay = Arc::new(RecordingRelay::default());
        relay.failing.store(true, Ordering::SeqCst);
        let (retrier, _tx) = retrier(&store, &relay);

        let n = queue_one(&store).await;
        retrier.notifier.deliver(&n).await;
        for _ in 1..MAX_NOTIFICATION_ATTEMPTS {
            store.age_notifications(time::Duration::hours(1)).await;
            assert_eq!(retrier.retry_due().await.unwrap(), 1);
        }

        let stored = store.notification(n.id).await.unwrap();
        assert_eq!(stored.status, NotificationStatus::Failed);
        assert_eq!(stored.attempts, MAX_NOTIFICATION_ATTEMPTS);

        store.age_notifications(time::Duration::hours(1)).await;
        assert_eq!(retrier.retry_due().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let store = Arc::new(MemoryStore::new());
        let relay = Arc::new(RecordingRelay::default());
        let (retrier, tx) = retrier(&store, &relay);
        let handle = tokio::spawn(retrier.run());
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
