//! Anti-forgery enforcement for state-changing guarded requests.
//!
//! Layered inside the access guard so the session extension is already
//! present. Safe methods pass through untouched.

use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, models::session::Session, services::csrf};

pub const CSRF_HEADER: &str = "x-csrf-token";

pub async fn csrf_protect(request: Request, next: Next) -> Result<Response, AppError> {
    if is_safe(request.method()) {
        return Ok(next.run(request).await);
    }

    let session = request
        .extensions()
        .get::<Session>()
        .ok_or(AppError::CsrfRejected)?;

    let submitted = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::CsrfRejected)?;

    if !csrf::verify(session, submitted) {
        return Err(AppError::CsrfRejected);
    }

    Ok(next.run(request).await)
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}
