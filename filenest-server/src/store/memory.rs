//! In-memory account storage

use std::collections::BTreeMap;
use std::sync::RwLock;

use filenest_core::AccountRecord;

use super::{AccountStore, StoreResult};
use crate::error::ServerError;

/// In-memory account store; `save` is a no-op
pub struct InMemoryAccountStore {
    accounts: RwLock<BTreeMap<String, AccountRecord>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(BTreeMap::new()),
        }
    }

    /// Build a store from already loaded records. The first record wins
    /// when a login appears twice; the number of dropped duplicates is
    /// returned alongside the store.
    pub fn from_records(records: impl IntoIterator<Item = AccountRecord>) -> (Self, usize) {
        let mut accounts = BTreeMap::new();
        let mut duplicates = 0;
        for record in records {
            if accounts.contains_key(&record.login) {
                duplicates += 1;
                continue;
            }
            accounts.insert(record.login.clone(), record);
        }
        (
            Self {
                accounts: RwLock::new(accounts),
            },
            duplicates,
        )
    }

    pub fn len(&self) -> usize {
        self.accounts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn insert(&self, record: AccountRecord) -> StoreResult<()> {
        let mut accounts = self.accounts.write().unwrap_or_else(|e| e.into_inner());
        if accounts.contains_key(&record.login) {
            return Err(ServerError::Conflict);
        }
        accounts.insert(record.login.clone(), record);
        Ok(())
    }

    fn lookup(&self, login: &str) -> StoreResult<Option<AccountRecord>> {
        Ok(self
            .accounts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(login)
            .cloned())
    }

    fn contains(&self, login: &str) -> bool {
        self.accounts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(login)
    }

    fn list(&self) -> Vec<AccountRecord> {
        self.accounts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    fn save(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let store = InMemoryAccountStore::new();
        store
            .insert(AccountRecord::new("alice", "alice@example.com", "longenough"))
            .unwrap();

        let found = store.lookup("alice").unwrap().unwrap();
        assert_eq!(found.email, "alice@example.com");
        assert!(store.contains("alice"));
        assert!(store.lookup("bob").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_insert_conflicts_and_keeps_original() {
        let store = InMemoryAccountStore::new();
        store
            .insert(AccountRecord::new("alice", "alice@example.com", "longenough"))
            .unwrap();

        let result = store.insert(AccountRecord::new("alice", "other@example.com", "different1"));
        assert!(matches!(result, Err(ServerError::Conflict)));
        assert_eq!(store.lookup("alice").unwrap().unwrap().email, "alice@example.com");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_list_is_sorted_by_login() {
        let store = InMemoryAccountStore::new();
        for login in ["carol", "alice", "bob"] {
            store
                .insert(AccountRecord::new(login, "x@example.com", "longenough"))
                .unwrap();
        }
        let logins: Vec<String> = store.list().into_iter().map(|r| r.login).collect();
        assert_eq!(logins, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_from_records_keeps_first_duplicate() {
        let (store, duplicates) = InMemoryAccountStore::from_records([
            AccountRecord::new("alice", "first@example.com", "longenough"),
            AccountRecord::new("alice", "second@example.com", "longenough"),
        ]);
        assert_eq!(duplicates, 1);
        assert_eq!(store.lookup("alice").unwrap().unwrap().email, "first@example.com");
    }
}
