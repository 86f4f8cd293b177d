//! Credential store abstraction.
//!
//! One trait, two backends. The JSON-file and PostgreSQL implementations
//! must not drift: both do case-insensitive exact lookup, both return
//! `Ok(None)` for unknown identifiers, and both reserve `Err` for storage
//! being genuinely unreachable (which callers surface as
//! `StorageUnavailable`, never as a login failure).

use async_trait::async_trait;

use crate::models::account::{Account, AccountStatus};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Looks up an account by username or email, case-insensitively.
    /// Unknown identifiers are `Ok(None)`, not errors.
    async fn find_by_identifier(&self, identifier: &str) -> anyhow::Result<Option<Account>>;

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Account>>;

    /// Returns one page of accounts plus the total count.
    async fn list(&self, limit: i64, offset: i64) -> anyhow::Result<(Vec<Account>, i64)>;

    /// Inserts a new account. Returns `Ok(false)` when the username or
    /// email is already taken.
    async fn insert(&self, account: &Account) -> anyhow::Result<bool>;

    /// Updates an account's status. Returns `Ok(false)` when no account
    /// has the given id.
    async fn set_status(&self, id: &str, status: AccountStatus) -> anyhow::Result<bool>;
}
