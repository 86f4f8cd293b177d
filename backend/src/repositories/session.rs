//! Session store abstraction.
//!
//! Sessions are explicit records behind this trait, never ambient state.
//! The in-memory implementation serves tests and single-node deployments;
//! the Redis implementation serves production.

use async_trait::async_trait;

use crate::models::session::Session;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: &Session) -> anyhow::Result<()>;

    /// Fetches a session by id. Unknown ids are `Ok(None)`; `Err` means the
    /// store itself is unreachable.
    async fn get(&self, session_id: &str) -> anyhow::Result<Option<Session>>;

    /// Persists a refreshed `last_activity` timestamp.
    async fn update(&self, session: &Session) -> anyhow::Result<()>;

    async fn delete(&self, session_id: &str) -> anyhow::Result<()>;

    /// Destroys every session belonging to one account (admin suspension,
    /// forced logout). Returns the number of sessions removed.
    async fn delete_for_account(&self, account_id: &str) -> anyhow::Result<u64>;
}
