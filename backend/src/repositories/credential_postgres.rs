//! PostgreSQL-backed credential store.

use async_trait::async_trait;
use sqlx::FromRow;

use crate::db::connection::DbPool;
use crate::models::account::{Account, AccountStatus, Permissions, Role};
use crate::repositories::credential::CredentialStore;

const ACCOUNT_COLUMNS: &str =
    "id, username, email, password_hash, LOWER(role) AS role, LOWER(status) AS status, permissions";

#[derive(Debug, FromRow)]
struct AccountRow {
    id: String,
    username: String,
    email: String,
    password_hash: String,
    role: Role,
    status: AccountStatus,
    permissions: sqlx::types::Json<Permissions>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role,
            status: row.status,
            permissions: row.permissions.0,
        }
    }
}

pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_identifier(&self, identifier: &str) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts \
             WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1)",
            ACCOUNT_COLUMNS
        ))
        .bind(identifier)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Account::from))
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Account::from))
    }

    async fn list(&self, limit: i64, offset: i64) -> anyhow::Result<(Vec<Account>, i64)> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts ORDER BY username LIMIT $1 OFFSET $2",
            ACCOUNT_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok((rows.into_iter().map(Account::from).collect(), total))
    }

    async fn insert(&self, account: &Account) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "INSERT INTO accounts (id, username, email, password_hash, role, status, permissions) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT DO NOTHING",
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role)
        .bind(account.status)
        .bind(sqlx::types::Json(&account.permissions))
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_status(&self, id: &str, status: AccountStatus) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE accounts SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
