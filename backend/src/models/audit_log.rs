//! Append-only audit records for authentication attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One authentication attempt, successful or not. Appended for every call
/// into the authenticator; never updated or deleted.
pub struct AuthAttempt {
    pub id: String,
    pub occurred_at: DateTime<Utc>,
    /// Identifier as submitted (username or email). The password is never
    /// recorded.
    pub identifier: String,
    pub success: bool,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
}

impl AuthAttempt {
    pub fn new(
        identifier: &str,
        success: bool,
        ip: Option<String>,
        user_agent: Option<String>,
        request_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            occurred_at: Utc::now(),
            identifier: identifier.to_string(),
            success,
            ip,
            user_agent,
            request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_attempt_stamps_id_and_time() {
        let attempt = AuthAttempt::new("demo@example.com", false, None, None, None);
        assert!(!attempt.id.is_empty());
        assert_eq!(attempt.identifier, "demo@example.com");
        assert!(!attempt.success);
        assert!(attempt.occurred_at <= Utc::now());
    }
}
