//! Per-session anti-forgery tokens.
//!
//! One token per session, generated at session creation and valid until
//! the session ends. Verification is constant-time.

use subtle::ConstantTimeEq;

use crate::models::session::Session;

/// Returns the session's anti-forgery token. Idempotent: the same session
/// always yields the same token.
pub fn issue(session: &Session) -> &str {
    &session.csrf_token
}

/// Constant-time comparison of a submitted token against the session's.
pub fn verify(session: &Session, submitted: &str) -> bool {
    session
        .csrf_token
        .as_bytes()
        .ct_eq(submitted.as_bytes())
        .into()
}
