//! Login, logout, and session introspection endpoints.

use std::time::Duration;

use axum::{
    extract::{Extension, Query, State},
    http::{header, header::USER_AGENT, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppError,
    models::{
        account::LoginCredentials,
        session::{Session, SessionResponse},
    },
    middleware::request_id::RequestId,
    services::{csrf, AttemptContext},
    state::AppState,
    utils::{
        cookies::{build_clear_session_cookie, build_session_cookie},
        extract::FormOrJson,
    },
};

pub async fn login(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    headers: HeaderMap,
    FormOrJson(credentials): FormOrJson<LoginCredentials>,
) -> Result<Response, AppError> {
    let ctx = AttemptContext {
        ip: extract_ip(&headers),
        user_agent: extract_user_agent(&headers),
        request_id: request_id.map(|Extension(id)| id.0),
    };

    let session = state
        .authenticator()
        .authenticate(credentials.identifier.trim(), &credentials.password, &ctx)
        .await?;

    let cookie = build_session_cookie(
        &session.session_id,
        session_cookie_max_age(),
        state.config.cookie_options(),
    );

    let destination = credentials
        .next
        .filter(|next| is_safe_next(next))
        .unwrap_or_else(|| session.role.landing_path().to_string());

    Ok(redirect_with_cookie(&destination, cookie))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, AppError> {
    state
        .sessions
        .delete(&session.session_id)
        .await
        .map_err(AppError::StorageUnavailable)?;

    let cookie = build_clear_session_cookie(state.config.cookie_options());
    Ok(redirect_with_cookie("/login?logged_out=1", cookie))
}

#[derive(Debug, Deserialize)]
pub struct LoginFormQuery {
    pub error: Option<String>,
    pub next: Option<String>,
    pub logged_out: Option<String>,
}

/// Login entry point. Denial redirects land here; the marker decides the
/// message, and the invalid-credentials message never says which field
/// was wrong.
pub async fn login_form(Query(query): Query<LoginFormQuery>) -> Json<Value> {
    let message = match query.error.as_deref() {
        Some(AppError::INVALID_MARKER) => Some("Invalid username or password"),
        Some(AppError::INACTIVE_MARKER) => Some("This account is not active"),
        Some(AppError::TIMEOUT_MARKER) => Some("Session expired, please log in again"),
        Some(_) => Some("Unable to log in"),
        None if query.logged_out.is_some() => Some("You have been logged out"),
        None => None,
    };

    Json(json!({
        "page": "login",
        "message": message,
        "next": query.next,
    }))
}

pub async fn me(Extension(session): Extension<Session>) -> Json<SessionResponse> {
    Json(SessionResponse::from(&session))
}

pub async fn csrf_token(Extension(session): Extension<Session>) -> Json<Value> {
    Json(json!({ "csrf_token": csrf::issue(&session) }))
}

// The cookie outlives the idle window; the server-side timeout check is
// authoritative.
const SESSION_COOKIE_MAX_AGE_HOURS: u64 = 12;

fn session_cookie_max_age() -> Duration {
    Duration::from_secs(SESSION_COOKIE_MAX_AGE_HOURS * 60 * 60)
}

fn redirect_with_cookie(location: &str, cookie: String) -> Response {
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, location.to_string()),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response()
}

/// Post-login destinations must stay on this host.
fn is_safe_next(next: &str) -> bool {
    next.starts_with('/') && !next.starts_with("//")
}

fn extract_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(',').next().unwrap_or(value).trim().to_string())
}

fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.1, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "203.0.113.2".parse().unwrap());
        assert_eq!(extract_ip(&headers).as_deref(), Some("203.0.113.1"));
    }

    #[test]
    fn extract_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "203.0.113.2".parse().unwrap());
        assert_eq!(extract_ip(&headers).as_deref(), Some("203.0.113.2"));
    }

    #[test]
    fn unsafe_next_targets_are_rejected() {
        assert!(is_safe_next("/dashboard"));
        assert!(is_safe_next("/admin/accounts?page=2"));
        assert!(!is_safe_next("//evil.example.com"));
        assert!(!is_safe_next("https://evil.example.com"));
        assert!(!is_safe_next("dashboard"));
    }

    #[tokio::test]
    async fn login_form_maps_markers_to_generic_messages() {
        let query = |error: Option<&str>, logged_out: Option<&str>| LoginFormQuery {
            error: error.map(String::from),
            next: None,
            logged_out: logged_out.map(String::from),
        };

        let Json(body) = login_form(Query(query(Some("invalid"), None))).await;
        assert_eq!(body["message"], "Invalid username or password");

        let Json(body) = login_form(Query(query(Some("timeout"), None))).await;
        assert_eq!(body["message"], "Session expired, please log in again");

        let Json(body) = login_form(Query(query(None, Some("1")))).await;
        assert_eq!(body["message"], "You have been logged out");

        let Json(body) = login_form(Query(query(None, None))).await;
        assert!(body["message"].is_null());
    }
}
