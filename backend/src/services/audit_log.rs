//! Audit log sinks for authentication attempts.
//!
//! The log is append-only. Callers await the write but swallow failures:
//! a broken audit sink must never turn into a login failure.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::db::connection::DbPool;
use crate::models::audit_log::AuthAttempt;

#[async_trait]
pub trait AuditLogServiceTrait: Send + Sync {
    async fn record_attempt(&self, attempt: AuthAttempt) -> anyhow::Result<()>;
}

/// PostgreSQL sink backing the `auth_attempts` table.
#[derive(Clone)]
pub struct PgAuditLog {
    pool: DbPool,
}

impl PgAuditLog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogServiceTrait for PgAuditLog {
    async fn record_attempt(&self, attempt: AuthAttempt) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO auth_attempts \
             (id, occurred_at, identifier, success, ip, user_agent, request_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&attempt.id)
        .bind(attempt.occurred_at)
        .bind(&attempt.identifier)
        .bind(attempt.success)
        .bind(&attempt.ip)
        .bind(&attempt.user_agent)
        .bind(&attempt.request_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}

/// Append-only JSONL file sink, used with the JSON credential backend.
pub struct FileAuditLog {
    path: PathBuf,
}

impl FileAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AuditLogServiceTrait for FileAuditLog {
    async fn record_attempt(&self, attempt: AuthAttempt) -> anyhow::Result<()> {
        let mut line = serde_json::to_vec(&attempt)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        Ok(())
    }
}

/// In-memory sink for tests.
#[derive(Default)]
pub struct MemoryAuditLog {
    attempts: Mutex<Vec<AuthAttempt>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> Vec<AuthAttempt> {
        self.attempts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl AuditLogServiceTrait for MemoryAuditLog {
    async fn record_attempt(&self, attempt: AuthAttempt) -> anyhow::Result<()> {
        self.attempts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(attempt);
        Ok(())
    }
}
