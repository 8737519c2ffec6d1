//! Account storage backed by a flat text file
//!
//! One account per line, `login : email : password`. The whole file is
//! rewritten on every save.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use filenest_core::AccountRecord;

use super::{AccountStore, InMemoryAccountStore, StoreResult};
use crate::error::ServerError;

/// Account store persisted to a `passwd`-style file
pub struct FileAccountStore {
    accounts: InMemoryAccountStore,
    path: PathBuf,
}

impl FileAccountStore {
    /// Open the store at `path`, loading whatever accounts it already holds.
    ///
    /// A missing file yields an empty store. Malformed lines are skipped.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let records = load(&path)?;
        let (accounts, duplicates) = InMemoryAccountStore::from_records(records);
        if duplicates > 0 {
            tracing::warn!(path = %path.display(), duplicates, "Ignored duplicate logins");
        }
        tracing::info!(path = %path.display(), count = accounts.len(), "Loaded accounts");

        Ok(Self { accounts, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read every well-formed account line from `path`
pub fn load(path: &Path) -> StoreResult<Vec<AccountRecord>> {
    tracing::debug!(path = %path.display(), "Loading accounts");
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No account file yet");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(ServerError::Persistence(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    Ok(contents
        .lines()
        .filter_map(|line| {
            let record = AccountRecord::parse_line(line);
            if record.is_none() && !line.trim().is_empty() {
                tracing::debug!("Skipping malformed account line");
            }
            record
        })
        .collect())
}

/// Overwrite `path` with one line per record
pub fn save(path: &Path, records: &[AccountRecord]) -> StoreResult<()> {
    let contents: String = records
        .iter()
        .map(|record| record.to_line() + "\n")
        .collect();

    fs::write(path, contents).map_err(|e| {
        ServerError::Persistence(format!("Failed to write {}: {}", path.display(), e))
    })
}

impl AccountStore for FileAccountStore {
    fn insert(&self, record: AccountRecord) -> StoreResult<()> {
        self.accounts.insert(record)
    }

    fn lookup(&self, login: &str) -> StoreResult<Option<AccountRecord>> {
        self.accounts.lookup(login)
    }

    fn contains(&self, login: &str) -> bool {
        self.accounts.contains(login)
    }

    fn list(&self) -> Vec<AccountRecord> {
        self.accounts.list()
    }

    fn save(&self) -> StoreResult<()> {
        save(&self.path, &self.accounts.list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let store = FileAccountStore::open(dir.path().join("passwd")).unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_save_then_reload_reproduces_accounts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("passwd");

        let store = FileAccountStore::open(&path).unwrap();
        store
            .insert(AccountRecord::new("bob", "bob@example.org", "hunter2hunter2"))
            .unwrap();
        store
            .insert(AccountRecord::new("alice", "alice@example.com", "longenough"))
            .unwrap();
        store.save().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "alice : alice@example.com : longenough\nbob : bob@example.org : hunter2hunter2\n"
        );

        let reloaded = FileAccountStore::open(&path).unwrap();
        assert_eq!(reloaded.list(), store.list());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("passwd");
        fs::write(
            &path,
            "alice : alice@example.com : longenough\n\
             garbage line\n\
             too : many : fields : here\n\
             bob : bob@example.org : hunter2hunter2\n",
        )
        .unwrap();

        let store = FileAccountStore::open(&path).unwrap();
        let logins: Vec<String> = store.list().into_iter().map(|r| r.login).collect();
        assert_eq!(logins, vec!["alice", "bob"]);
    }

    #[test]
    fn test_save_failure_is_reported_and_memory_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("passwd");

        let store = FileAccountStore::open(&path).unwrap();
        store
            .insert(AccountRecord::new("alice", "alice@example.com", "longenough"))
            .unwrap();

        assert!(matches!(store.save(), Err(ServerError::Persistence(_))));
        assert!(store.contains("alice"));
    }
}
