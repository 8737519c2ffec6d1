//! Storage abstractions for accounts and pending registrations

pub mod file;
pub mod memory;
pub mod pending;

pub use file::FileAccountStore;
pub use memory::InMemoryAccountStore;
pub use pending::{PendingRegistration, PendingRegistrations};

use filenest_core::AccountRecord;

use crate::error::ServerError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, ServerError>;

/// Trait for confirmed account storage
///
/// `insert` and `save` are separate steps. A crash between the two loses the
/// inserted account; callers that need the pair to be atomic with respect to
/// other writers must serialise it themselves.
pub trait AccountStore: Send + Sync {
    /// Insert a new account, failing with `Conflict` if the login is taken
    fn insert(&self, record: AccountRecord) -> StoreResult<()>;

    /// Get an account by login
    fn lookup(&self, login: &str) -> StoreResult<Option<AccountRecord>>;

    /// Whether an account with this login exists
    fn contains(&self, login: &str) -> bool;

    /// All accounts in store iteration order (sorted by login)
    fn list(&self) -> Vec<AccountRecord>;

    /// Write every account to the backing storage
    fn save(&self) -> StoreResult<()>;
}
