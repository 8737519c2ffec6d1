//! File-transfer server collaborator
//!
//! The protocol itself lives outside this crate. What the rest of the server
//! needs is a place to register users with their sandbox roots, a start/stop
//! switch, and a stream of command events for hooks such as the upload
//! dashboard.
//!
//! [`LocalTransferServer`] is only that registry. It does not listen on a
//! socket; a protocol frontend plugged in behind [`TransferServer`] reads the
//! user table and reports commands through `notify`. Without one, accounts
//! have no file transfer access and the upload dashboard stays at zero.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

/// Access granted to a transfer user within its root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ReadOnly,
    All,
}

/// Interface the provisioning code drives
pub trait TransferServer: Send + Sync {
    fn add_user_anonymous(&self, root: &Path, permission: Permission) -> Result<(), String>;

    fn add_user(
        &self,
        login: &str,
        password: &str,
        root: &Path,
        permission: Permission,
    ) -> Result<(), String>;

    fn start(&self, workers: usize) -> Result<(), String>;

    fn stop(&self);
}

/// One command executed by a transfer session
#[derive(Debug, Clone)]
pub struct TransferEvent {
    /// Protocol command, e.g. `STOR`
    pub command: String,
    pub parameters: String,
    /// Session working directory, relative to the user root
    pub working_dir: String,
    pub user_root: PathBuf,
}

pub type EventHook = Box<dyn Fn(&TransferEvent) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferUser {
    pub password: String,
    pub root: PathBuf,
    pub permission: Permission,
}

/// In-process transfer user registry.
///
/// Keeps the user table and the hook list; protocol sessions report their
/// commands through [`LocalTransferServer::notify`]. `start` and `stop` only
/// track whether the registry is open for such sessions.
pub struct LocalTransferServer {
    users: RwLock<HashMap<String, TransferUser>>,
    anonymous: RwLock<Option<(PathBuf, Permission)>>,
    hooks: Mutex<Vec<EventHook>>,
    running: AtomicBool,
    workers: AtomicUsize,
}

impl LocalTransferServer {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            anonymous: RwLock::new(None),
            hooks: Mutex::new(Vec::new()),
            running: AtomicBool::new(false),
            workers: AtomicUsize::new(0),
        }
    }

    /// Append a hook; hooks run in registration order
    pub fn add_event_hook<F>(&self, hook: F)
    where
        F: Fn(&TransferEvent) + Send + Sync + 'static,
    {
        self.hooks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(hook));
    }

    /// Run every hook for `event`. The hook lock is held for the whole pass,
    /// so hooks from different worker threads never overlap.
    pub fn notify(&self, event: &TransferEvent) {
        let hooks = self.hooks.lock().unwrap_or_else(|e| e.into_inner());
        for hook in hooks.iter() {
            hook(event);
        }
    }

    pub fn user(&self, login: &str) -> Option<TransferUser> {
        self.users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(login)
            .cloned()
    }

    pub fn anonymous(&self) -> Option<(PathBuf, Permission)> {
        self.anonymous
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn workers(&self) -> usize {
        self.workers.load(Ordering::SeqCst)
    }
}

impl Default for LocalTransferServer {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferServer for LocalTransferServer {
    fn add_user_anonymous(&self, root: &Path, permission: Permission) -> Result<(), String> {
        tracing::debug!(root = %root.display(), ?permission, "Adding anonymous transfer user");
        *self.anonymous.write().unwrap_or_else(|e| e.into_inner()) =
            Some((root.to_path_buf(), permission));
        Ok(())
    }

    fn add_user(
        &self,
        login: &str,
        password: &str,
        root: &Path,
        permission: Permission,
    ) -> Result<(), String> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        if users.contains_key(login) {
            return Err(format!("Transfer user {} already exists", login));
        }
        users.insert(
            login.to_string(),
            TransferUser {
                password: password.to_string(),
                root: root.to_path_buf(),
                permission,
            },
        );
        tracing::debug!(login = %login, root = %root.display(), "Added transfer user");
        Ok(())
    }

    fn start(&self, workers: usize) -> Result<(), String> {
        if workers == 0 {
            return Err("Transfer server needs at least one worker".to_string());
        }
        if self.running.swap(true, Ordering::SeqCst) {
            return Err("Transfer server already running".to_string());
        }
        self.workers.store(workers, Ordering::SeqCst);
        tracing::info!(
            workers,
            "Transfer registry open; no protocol listener is attached"
        );
        Ok(())
    }

    fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            self.workers.store(0, Ordering::SeqCst);
            tracing::info!("Transfer registry closed");
        }
    }
}

/// Hook that logs every transfer command
pub fn logging_hook() -> impl Fn(&TransferEvent) + Send + Sync + 'static {
    |event: &TransferEvent| {
        tracing::info!(
            command = %event.command,
            parameters = %event.parameters,
            working_dir = %event.working_dir,
            "Transfer command"
        );
    }
}
