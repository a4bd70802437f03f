//! Signal handling for graceful shutdown and background workers.

use crate::state::AppState;
use mrportal_core::processors::NotificationRetrier;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Creates a future that completes when a shutdown signal is received.
///
/// Listens for SIGTERM and SIGINT (Ctrl+C). A handler that cannot be
/// installed is logged and never fires.
pub async fn shutdown_signal() {
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    let interrupt = async {
        match signal(SignalKind::interrupt()) {
            Ok(mut sigint) => {
                sigint.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGINT handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = interrupt => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
    }
}

/// Background tasks that run next to the HTTP server.
pub struct BackgroundWorkers {
    shutdown_tx: watch::Sender<bool>,
    retrier: JoinHandle<()>,
}

impl BackgroundWorkers {
    /// Spawn the notification retrier.
    pub fn spawn(state: &AppState) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let retrier =
            NotificationRetrier::new(state.leads.clone(), state.notifier.clone(), shutdown_rx);
        Self {
            shutdown_tx,
            retrier: tokio::spawn(retrier.run()),
        }
    }

    /// Signal every worker to stop and wait for them.
    pub async fn shutdown(self) {
        if self.shutdown_tx.send(true).is_err() {
            tracing::debug!("Background workers already stopped");
        }
        if let Err(e) = self.retrier.await {
            tracing::error!(error = %e, "Notification retrier task failed");
        }
    }
}
