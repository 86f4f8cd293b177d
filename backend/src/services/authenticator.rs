//! Credential validation and session establishment.

use std::sync::Arc;

use chrono::Utc;

use crate::error::AppError;
use crate::models::audit_log::AuthAttempt;
use crate::models::session::Session;
use crate::repositories::{CredentialStore, SessionStore};
use crate::services::audit_log::AuditLogServiceTrait;
use crate::utils::password::verify_password;

/// Request-scoped metadata recorded with every authentication attempt.
#[derive(Debug, Clone, Default)]
pub struct AttemptContext {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Clone)]
pub struct Authenticator {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    audit: Arc<dyn AuditLogServiceTrait>,
}

impl Authenticator {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        audit: Arc<dyn AuditLogServiceTrait>,
    ) -> Self {
        Self {
            credentials,
            sessions,
            audit,
        }
    }

    /// Validates the submitted credentials and establishes a session.
    ///
    /// Unknown identifiers and wrong passwords both yield
    /// `InvalidCredentials` — the caller cannot tell which check failed.
    /// Every attempt, successful or not, is appended to the audit log.
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
        ctx: &AttemptContext,
    ) -> Result<Session, AppError> {
        let account = self
            .credentials
            .find_by_identifier(identifier)
            .await
            .map_err(AppError::StorageUnavailable)?;

        let Some(account) = account else {
            self.record(identifier, false, ctx).await;
            return Err(AppError::InvalidCredentials);
        };

        // Inactive accounts may not authenticate. Admin accounts are exempt
        // from the status gate (observed platform policy, preserved as-is).
        if !account.is_active() && !account.is_admin() {
            self.record(identifier, false, ctx).await;
            return Err(AppError::AccountInactive);
        }

        let matches =
            verify_password(password, &account.password_hash).map_err(AppError::Internal)?;
        if !matches {
            self.record(identifier, false, ctx).await;
            return Err(AppError::InvalidCredentials);
        }

        let session = Session::start(&account, Utc::now());
        self.sessions
            .insert(&session)
            .await
            .map_err(AppError::StorageUnavailable)?;

        self.record(identifier, true, ctx).await;
        Ok(session)
    }

    /// Audit append. Failures are logged and swallowed; a broken audit sink
    /// never surfaces to the caller.
    async fn record(&self, identifier: &str, success: bool, ctx: &AttemptContext) {
        let attempt = AuthAttempt::new(
            identifier,
            success,
            ctx.ip.clone(),
            ctx.user_agent.clone(),
            ctx.request_id.clone(),
        );
        if let Err(err) = self.audit.record_attempt(attempt).await {
            tracing::warn!(error = ?err, identifier, "Failed to record auth attempt");
        }
    }
}
