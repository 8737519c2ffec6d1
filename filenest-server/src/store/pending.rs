//! Pending-registration table, keyed by confirmation token

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use filenest_core::{draw_token, AccountRecord};
use rand::Rng;

use super::StoreResult;
use crate::error::ServerError;

/// A registration waiting for its confirmation link to be followed
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub account: AccountRecord,
    pub created_at: DateTime<Utc>,
}

impl PendingRegistration {
    pub fn new(account: AccountRecord) -> Self {
        Self {
            account,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        now - self.created_at > max_age
    }
}

/// Token-addressed registrations that have not been confirmed yet
pub struct PendingRegistrations {
    entries: RwLock<HashMap<u32, PendingRegistration>>,
}

impl PendingRegistrations {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn contains(&self, token: u32) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&token)
    }

    /// Draw a fresh non-zero token that is not currently pending.
    ///
    /// Gives up with `Internal` after a bounded number of collisions.
    pub fn generate_token(&self) -> StoreResult<u32> {
        let mut rng = rand::thread_rng();
        self.generate_token_with(|| rng.gen())
    }

    /// Same as `generate_token`, drawing from the supplied source
    pub fn generate_token_with<R: FnMut() -> u32>(&self, rng: R) -> StoreResult<u32> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        draw_token(rng, |token| entries.contains_key(&token))
            .ok_or_else(|| ServerError::Internal("Could not generate a unique token".to_string()))
    }

    /// Reserve `token` for `pending`. Fails if the token is zero or already taken.
    pub fn insert_pending(&self, token: u32, pending: PendingRegistration) -> StoreResult<()> {
        if token == 0 {
            return Err(ServerError::Internal("Refusing zero token".to_string()));
        }
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.contains_key(&token) {
            return Err(ServerError::Internal("Token already pending".to_string()));
        }
        entries.insert(token, pending);
        Ok(())
    }

    pub fn find_pending(&self, token: u32) -> StoreResult<PendingRegistration> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&token)
            .cloned()
            .ok_or_else(|| ServerError::NotFound("Invalid link".to_string()))
    }

    pub fn remove_pending(&self, token: u32) -> Option<PendingRegistration> {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&token)
    }

    /// Drop entries older than `max_age`, returning how many were removed
    pub fn cleanup_expired(&self, max_age: Duration) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, pending| !pending.is_expired(max_age, now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PendingRegistrations {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> PendingRegistration {
        PendingRegistration::new(AccountRecord::new("alice", "alice@example.com", "longenough"))
    }

    #[test]
    fn test_insert_find_remove() {
        let table = PendingRegistrations::new();
        table.insert_pending(42, alice()).unwrap();

        assert!(table.contains(42));
        assert_eq!(table.find_pending(42).unwrap().account.login, "alice");

        assert!(table.remove_pending(42).is_some());
        assert!(matches!(table.find_pending(42), Err(ServerError::NotFound(_))));
        assert!(table.remove_pending(42).is_none());
    }

    #[test]
    fn test_insert_refuses_taken_and_zero_tokens() {
        let table = PendingRegistrations::new();
        table.insert_pending(7, alice()).unwrap();

        assert!(table.insert_pending(7, alice()).is_err());
        assert!(table.insert_pending(0, alice()).is_err());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_generate_token_skips_pending_and_zero() {
        let table = PendingRegistrations::new();
        table.insert_pending(5, alice()).unwrap();

        let mut draws = [0u32, 5, 5, 9].into_iter();
        let token = table.generate_token_with(|| draws.next().unwrap_or(0)).unwrap();
        assert_eq!(token, 9);
    }

    #[test]
    fn test_generate_token_gives_up_after_bound() {
        let table = PendingRegistrations::new();
        table.insert_pending(5, alice()).unwrap();

        let mut calls = 0;
        let result = table.generate_token_with(|| {
            calls += 1;
            5
        });
        assert!(matches!(result, Err(ServerError::Internal(_))));
        assert_eq!(calls, filenest_core::MAX_TOKEN_ATTEMPTS);
    }

    #[test]
    fn test_generated_tokens_are_unique_while_pending() {
        let table = PendingRegistrations::new();
        for _ in 0..100 {
            let token = table.generate_token().unwrap();
            assert_ne!(token, 0);
            table.insert_pending(token, alice()).unwrap();
        }
        assert_eq!(table.len(), 100);
    }

    #[test]
    fn test_cleanup_expired() {
        let table = PendingRegistrations::new();
        let mut old = alice();
        old.created_at = Utc::now() - Duration::minutes(90);
        table.insert_pending(1, old).unwrap();
        table.insert_pending(2, alice()).unwrap();

        assert_eq!(table.cleanup_expired(Duration::minutes(60)), 1);
        assert!(!table.contains(1));
        assert!(table.contains(2));
    }
}
