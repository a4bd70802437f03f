//! Application state shared across all request handlers.

use crate::uploads::UploadDir;
use mrportal_core::config::RuntimeConfig;
use mrportal_core::gateway::PaymentGateway;
use mrportal_core::mail::MailRelay;
use mrportal_core::processors::Notifier;
use mrportal_core::store::{AccountStore, CatalogStore, LeadStore, PaymentStore};
use mrportal_sdk::token::TokenSigner;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub payments: Arc<dyn PaymentStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub leads: Arc<dyn LeadStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    /// Sends outbox notifications right after a submission.
    pub notifier: Notifier,
    pub tokens: TokenSigner,
    pub uploads: UploadDir,
    /// Runtime configuration, fixed for the life of the process.
    pub config: Arc<RuntimeConfig>,
}

impl AppState {
    /// Create a new AppState backed by one store implementing every
    /// persistence trait.
    pub fn new<S>(
        store: Arc<S>,
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn MailRelay>,
        config: RuntimeConfig,
    ) -> Self
    where
        S: AccountStore + PaymentStore + CatalogStore + LeadStore + 'static,
    {
        let notifier = Notifier::new(store.clone(), mailer, config.mail.from.clone());
        Self {
            accounts: store.clone(),
            payments: store.clone(),
            catalog: store.clone(),
            leads: store,
            gateway,
            notifier,
            tokens: TokenSigner::new(config.tokens.secret.as_bytes()),
            uploads: UploadDir::new(config.server.uploads_dir.clone()),
            config: Arc::new(config),
        }
    }
}
