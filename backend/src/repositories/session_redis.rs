//! Redis-backed session store.
//!
//! Each session lives under `session:{id}` as a JSON document; a per-account
//! set under `account_sessions:{account_id}` supports bulk revocation.
//! Keys carry a TTL slightly beyond the idle window as a safety net — the
//! access guard's explicit timeout check remains authoritative.

use async_trait::async_trait;
use bb8_redis::redis::{self, AsyncCommands};

use crate::db::redis::RedisPool;
use crate::models::session::{Session, IDLE_TIMEOUT_MINUTES};
use crate::repositories::session::SessionStore;

const TTL_SLACK_SECONDS: u64 = 300;

pub struct RedisSessionStore {
    pool: RedisPool,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub fn new(pool: RedisPool) -> Self {
        Self {
            pool,
            ttl_seconds: (IDLE_TIMEOUT_MINUTES as u64) * 60 + TTL_SLACK_SECONDS,
        }
    }

    fn session_key(session_id: &str) -> String {
        format!("session:{}", session_id)
    }

    fn account_key(account_id: &str) -> String {
        format!("account_sessions:{}", account_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn insert(&self, session: &Session) -> anyhow::Result<()> {
        let mut conn = self.pool.get().await?;
        let key = Self::session_key(&session.session_id);
        let account_key = Self::account_key(&session.account_id);
        let payload = serde_json::to_string(session)?;

        redis::pipe()
            .atomic()
            .set_ex(&key, payload, self.ttl_seconds)
            .sadd(&account_key, &session.session_id)
            .expire(&account_key, self.ttl_seconds as i64)
            .query_async::<_, ()>(&mut *conn)
            .await?;

        Ok(())
    }

    async fn get(&self, session_id: &str) -> anyhow::Result<Option<Session>> {
        let mut conn = self.pool.get().await?;
        let raw: Option<String> = conn.get(Self::session_key(session_id)).await?;
        match raw {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, session: &Session) -> anyhow::Result<()> {
        let mut conn = self.pool.get().await?;
        let payload = serde_json::to_string(session)?;

        // Rewriting with set_ex also slides the safety-net TTL along with
        // the refreshed activity timestamp.
        redis::pipe()
            .atomic()
            .set_ex(Self::session_key(&session.session_id), payload, self.ttl_seconds)
            .expire(
                Self::account_key(&session.account_id),
                self.ttl_seconds as i64,
            )
            .query_async::<_, ()>(&mut *conn)
            .await?;

        Ok(())
    }

    async fn delete(&self, session_id: &str) -> anyhow::Result<()> {
        let mut conn = self.pool.get().await?;

        // The membership entry in the account set is left to expire with
        // its TTL; revocation paths re-read the set before acting on it.
        conn.del::<_, ()>(Self::session_key(session_id)).await?;
        Ok(())
    }

    async fn delete_for_account(&self, account_id: &str) -> anyhow::Result<u64> {
        let mut conn = self.pool.get().await?;
        let account_key = Self::account_key(account_id);

        let session_ids: Vec<String> = conn.smembers(&account_key).await?;
        if session_ids.is_empty() {
            return Ok(0);
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for session_id in &session_ids {
            pipe.del(Self::session_key(session_id));
        }
        pipe.del(&account_key);
        pipe.query_async::<_, ()>(&mut *conn).await?;

        Ok(session_ids.len() as u64)
    }
}
