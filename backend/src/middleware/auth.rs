//! Access guards: authentication, role gating, and idle timeout.
//!
//! Every guarded request runs the same sequence: resolve the session from
//! the cookie, apply the idle-timeout check (destroying the record on
//! expiry), refresh the activity timestamp, then gate on role. Denials are
//! `AppError` values whose responses are redirects — no handler runs, so
//! no protected data can leak.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::{
    error::AppError,
    models::{account::Role, session::Session},
    state::AppState,
    utils::cookies::{extract_cookie_value, SESSION_COOKIE_NAME},
};

pub async fn auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session_id = session_cookie(&request);
    let requested = original_path(&request);
    let session = authenticate_request(&state, session_id, requested).await?;
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

// Auth + require the admin role for admin-only routes.
pub async fn auth_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    guard_role(state, request, next, Role::Admin).await
}

pub async fn auth_operator(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    guard_role(state, request, next, Role::Operator).await
}

pub async fn auth_reseller(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    guard_role(state, request, next, Role::Reseller).await
}

async fn guard_role(
    state: AppState,
    mut request: Request,
    next: Next,
    role: Role,
) -> Result<Response, AppError> {
    // Timeout check always precedes the role check.
    let session_id = session_cookie(&request);
    let requested = original_path(&request);
    let session = authenticate_request(&state, session_id, requested).await?;
    if session.role != role {
        return Err(AppError::AccessDenied);
    }
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Extracts the session id from the request's cookie header, if present.
fn session_cookie(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| extract_cookie_value(raw, SESSION_COOKIE_NAME))
}

/// Resolves and refreshes the session for one guarded request.
async fn authenticate_request(
    state: &AppState,
    session_id: Option<String>,
    requested: String,
) -> Result<Session, AppError> {
    let session_id = session_id.ok_or_else(|| AppError::Unauthenticated {
        next: Some(requested.clone()),
    })?;

    let session = state
        .sessions
        .get(&session_id)
        .await
        .map_err(AppError::StorageUnavailable)?;

    // A cookie pointing at no record is a stale cookie, not an expired
    // session: the caller gets the fresh not-logged-in treatment.
    let Some(mut session) = session else {
        return Err(AppError::Unauthenticated {
            next: Some(requested),
        });
    };

    let now = Utc::now();
    if session.is_expired_at(now) {
        state
            .sessions
            .delete(&session.session_id)
            .await
            .map_err(AppError::StorageUnavailable)?;
        return Err(AppError::SessionExpired);
    }

    session.touch(now);
    state
        .sessions
        .update(&session)
        .await
        .map_err(AppError::StorageUnavailable)?;

    Ok(session)
}

fn original_path(request: &Request) -> String {
    request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}
