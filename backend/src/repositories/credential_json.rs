//! JSON-file-backed credential store.
//!
//! The accounts file is a JSON array of account records, re-read on every
//! lookup so external edits take effect without a restart. Mutations
//! rewrite the file through a temporary sibling and an atomic rename.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;

use crate::models::account::{Account, AccountStatus};
use crate::repositories::credential::CredentialStore;

pub struct JsonCredentialStore {
    path: PathBuf,
}

impl JsonCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> anyhow::Result<Vec<Account>> {
        let raw = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read accounts file {}", self.path.display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("Malformed accounts file {}", self.path.display()))
    }

    async fn persist(&self, accounts: &[Account]) -> anyhow::Result<()> {
        let raw = serde_json::to_vec_pretty(accounts).context("Failed to encode accounts")?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &raw)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for JsonCredentialStore {
    async fn find_by_identifier(&self, identifier: &str) -> anyhow::Result<Option<Account>> {
        let accounts = self.load().await?;
        Ok(accounts
            .into_iter()
            .find(|account| account.matches_identifier(identifier)))
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Account>> {
        let accounts = self.load().await?;
        Ok(accounts.into_iter().find(|account| account.id == id))
    }

    async fn list(&self, limit: i64, offset: i64) -> anyhow::Result<(Vec<Account>, i64)> {
        let mut accounts = self.load().await?;
        accounts.sort_by(|a, b| a.username.cmp(&b.username));
        let total = accounts.len() as i64;
        let page = accounts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn insert(&self, account: &Account) -> anyhow::Result<bool> {
        let mut accounts = self.load().await?;
        let taken = accounts.iter().any(|existing| {
            existing.matches_identifier(&account.username)
                || existing.matches_identifier(&account.email)
        });
        if taken {
            return Ok(false);
        }
        accounts.push(account.clone());
        self.persist(&accounts).await?;
        Ok(true)
    }

    async fn set_status(&self, id: &str, status: AccountStatus) -> anyhow::Result<bool> {
        let mut accounts = self.load().await?;
        let Some(account) = accounts.iter_mut().find(|account| account.id == id) else {
            return Ok(false);
        };
        account.status = status;
        self.persist(&accounts).await?;
        Ok(true)
    }
}
