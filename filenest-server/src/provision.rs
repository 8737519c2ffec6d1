//! Provisioning of per-account storage roots

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use filenest_core::AccountRecord;

use crate::error::ServerError;
use crate::transfer::{Permission, TransferServer};

/// Creates storage roots and hands accounts to the transfer server
pub struct Provisioner {
    base: PathBuf,
    transfer: Option<Arc<dyn TransferServer>>,
}

impl Provisioner {
    pub fn new(base: impl Into<PathBuf>, transfer: Option<Arc<dyn TransferServer>>) -> Self {
        Self {
            base: base.into(),
            transfer,
        }
    }

    /// `<base>/<login>`
    pub fn storage_root(&self, login: &str) -> PathBuf {
        self.base.join(login)
    }

    /// Ensure the account's storage root exists, then register the account
    /// with the transfer server.
    ///
    /// If the directory cannot be created the account is not registered.
    /// The account itself stays in the store either way.
    pub fn provision(&self, account: &AccountRecord) -> Result<PathBuf, ServerError> {
        let root = self.storage_root(&account.login);

        if let Err(e) = ensure_dir(&root) {
            tracing::error!(
                login = %account.login,
                root = %root.display(),
                error = %e,
                "Could not create storage root; account has no file transfer access"
            );
            return Err(ServerError::Internal(format!(
                "Failed to create {}: {}",
                root.display(),
                e
            )));
        }

        if let Some(transfer) = &self.transfer {
            transfer
                .add_user(&account.login, &account.password, &root, Permission::All)
                .map_err(|e| {
                    tracing::warn!(login = %account.login, error = %e, "Transfer registration failed");
                    ServerError::Internal(e)
                })?;
        }

        tracing::info!(login = %account.login, root = %root.display(), "Provisioned account");
        Ok(root)
    }
}

/// Make sure `path` is a directory. An existing directory is reused; any
/// other entry at that path is removed first.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(meta) if meta.file_type().is_symlink() && path.is_dir() => return Ok(()),
        Ok(_) => {
            tracing::warn!(path = %path.display(), "Replacing non-directory entry");
            fs::remove_file(path)?;
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path)
}
