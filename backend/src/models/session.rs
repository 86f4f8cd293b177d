//! Server-side session records and the per-request session state machine.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::account::{Account, Role};
use crate::utils::token::generate_token;

/// Fixed idle timeout. A session with no guarded activity for longer than
/// this is destroyed on its next use.
pub const IDLE_TIMEOUT_MINUTES: i64 = 30;

pub fn idle_timeout() -> Duration {
    Duration::minutes(IDLE_TIMEOUT_MINUTES)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One authenticated browsing context, persisted in the session store and
/// addressed by the opaque `session_id` carried in the session cookie.
pub struct Session {
    pub session_id: String,
    pub account_id: String,
    /// Role copied from the account at login time. Not re-checked per
    /// request; admin suspension revokes the session instead.
    pub role: Role,
    pub login_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Anti-forgery token, generated once at session creation and valid for
    /// the life of the session.
    pub csrf_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Per-request state of a presented session. `Anonymous` is represented by
/// the absence of a record; a session read from the store is either still
/// authenticated or expired, and an expired session's only way forward is
/// destruction followed by a fresh login.
pub enum SessionState {
    Authenticated,
    Expired,
}

impl Session {
    /// Creates a session for a freshly authenticated account.
    /// `last_activity` starts equal to `login_time`.
    pub fn start(account: &Account, now: DateTime<Utc>) -> Self {
        Self {
            session_id: generate_token(),
            account_id: account.id.clone(),
            role: account.role,
            login_time: now,
            last_activity: now,
            csrf_token: generate_token(),
        }
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> SessionState {
        if now - self.last_activity > idle_timeout() {
            SessionState::Expired
        } else {
            SessionState::Authenticated
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == SessionState::Expired
    }

    /// Refreshes the activity timestamp on a granted guarded request.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }
}

#[derive(Debug, Serialize)]
/// Session summary returned by `/auth/me`.
pub struct SessionResponse {
    pub account_id: String,
    pub role: Role,
    pub login_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        SessionResponse {
            account_id: session.account_id.clone(),
            role: session.role,
            login_time: session.login_time,
            last_activity: session.last_activity,
        }
    }
}
