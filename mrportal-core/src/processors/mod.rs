//! Background and delivery processors.
//!
//! - `Notifier`: makes one delivery attempt for an outbox notification
//! - `NotificationRetrier`: periodically retries due notifications until shutdown

pub mod notification_retrier;
pub mod notifier;

pub use notification_retrier::NotificationRetrier;
pub use notifier::Notifier;
