//! In-memory session store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::models::session::Session;
use crate::repositories::session::SessionStore;

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_guard(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: &Session) -> anyhow::Result<()> {
        self.write_guard()
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn get(&self, session_id: &str) -> anyhow::Result<Option<Session>> {
        Ok(self.read_guard().get(session_id).cloned())
    }

    async fn update(&self, session: &Session) -> anyhow::Result<()> {
        self.write_guard()
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> anyhow::Result<()> {
        self.write_guard().remove(session_id);
        Ok(())
    }

    async fn delete_for_account(&self, account_id: &str) -> anyhow::Result<u64> {
        let mut sessions = self.write_guard();
        let before = sessions.len();
        sessions.retain(|_, session| session.account_id != account_id);
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::{Account, AccountStatus, Permissions, Role};
    use chrono::Utc;

    fn session_for(account_id: &str) -> Session {
        let account = Account {
            id: account_id.to_string(),
            username: format!("user-{}", account_id),
            email: format!("{}@example.com", account_id),
            password_hash: "hash".into(),
            role: Role::Customer,
            status: AccountStatus::Active,
            permissions: Permissions::none(),
        };
        Session::start(&account, Utc::now())
    }

    #[tokio::test]
    async fn insert_get_delete_round_trip() {
        let store = MemorySessionStore::new();
        let session = session_for("a1");

        store.insert(&session).await.unwrap();
        let loaded = store.get(&session.session_id).await.unwrap().unwrap();
        assert_eq!(loaded.account_id, "a1");

        store.delete(&session.session_id).await.unwrap();
        assert!(store.get(&session.session_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_id_is_none_not_error() {
        let store = MemorySessionStore::new();
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_for_account_removes_only_that_accounts_sessions() {
        let store = MemorySessionStore::new();
        store.insert(&session_for("a1")).await.unwrap();
        store.insert(&session_for("a1")).await.unwrap();
        let other = session_for("a2");
        store.insert(&other).await.unwrap();

        let removed = store.delete_for_account("a1").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert!(store.get(&other.session_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_persists_refreshed_activity() {
        let store = MemorySessionStore::new();
        let mut session = session_for("a1");
        store.insert(&session).await.unwrap();

        let later = Utc::now() + chrono::Duration::minutes(5);
        session.touch(later);
        store.update(&session).await.unwrap();

        let loaded = store.get(&session.session_id).await.unwrap().unwrap();
        assert_eq!(loaded.last_activity, later);
    }
}
