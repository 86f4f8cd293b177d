use std::sync::Arc;

use crate::config::Config;
use crate::repositories::{CredentialStore, SessionStore};
use crate::services::{AuditLogServiceTrait, Authenticator};

#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<dyn CredentialStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub audit: Arc<dyn AuditLogServiceTrait>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        audit: Arc<dyn AuditLogServiceTrait>,
        config: Config,
    ) -> Self {
        Self {
            credentials,
            sessions,
            audit,
            config,
        }
    }

    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(
            self.credentials.clone(),
            self.sessions.clone(),
            self.audit.clone(),
        )
    }
}
