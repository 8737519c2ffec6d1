//! Application state shared by all handlers

use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::email::EmailSender;
use crate::provision::Provisioner;
use crate::router::PathRouter;
use crate::store::{AccountStore, PendingRegistrations};
use crate::transfer::{Permission, TransferServer};

/// Application state
pub struct AppState<A: AccountStore, E: EmailSender> {
    pub config: Config,
    pub accounts: A,
    pub pending: PendingRegistrations,
    /// `None` means registrations are committed without confirmation
    pub email_sender: Option<Arc<E>>,
    pub provisioner: Provisioner,
    pub transfer: Arc<dyn TransferServer>,
    /// Routes registered at startup, consulted after the built-in ones
    pub router: PathRouter,
    /// Serialises each account insert+save pair
    pub commit_lock: Mutex<()>,
}

impl<A: AccountStore, E: EmailSender> AppState<A, E> {
    pub fn new(
        config: Config,
        accounts: A,
        email_sender: Option<E>,
        transfer: Arc<dyn TransferServer>,
        router: PathRouter,
    ) -> Self {
        let provisioner = Provisioner::new(
            config.web_root.clone(),
            config.filesystem_access.then(|| transfer.clone()),
        );

        Self {
            config,
            accounts,
            pending: PendingRegistrations::new(),
            email_sender: email_sender.map(Arc::new),
            provisioner,
            transfer,
            router,
            commit_lock: Mutex::new(()),
        }
    }

    /// Register the anonymous read-only user and provision every stored
    /// account. Returns the number of accounts provisioned.
    pub fn provision_all(&self) -> usize {
        if !self.config.filesystem_access {
            return 0;
        }

        if let Err(e) = self
            .transfer
            .add_user_anonymous(&self.config.web_root, Permission::ReadOnly)
        {
            tracing::warn!(error = %e, "Could not add anonymous transfer user");
        }

        self.accounts
            .list()
            .iter()
            .filter(|account| self.provisioner.provision(account).is_ok())
            .count()
    }
}
