use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Application error taxonomy.
///
/// The four "soft" denial kinds are converted into redirects carrying a
/// marker, so a denied request never renders protected data. Only storage
/// failures surface as hard 5xx responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No session at all: redirect to login, preserving the requested path.
    #[error("authentication required")]
    Unauthenticated { next: Option<String> },
    /// Unknown identifier or wrong password. One generic marker for both.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Account exists but is suspended or pending.
    #[error("account inactive")]
    AccountInactive,
    /// Idle timeout exceeded; the session record has been destroyed.
    #[error("session expired")]
    SessionExpired,
    /// Authenticated but the session's role does not grant this resource.
    #[error("access denied")]
    AccessDenied,
    /// Missing or mismatched anti-forgery token on a state-changing request.
    #[error("csrf token rejected")]
    CsrfRejected,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("validation failed")]
    Validation(Vec<String>),
    /// Backing store unreachable. The one case that propagates as a hard
    /// failure instead of a soft redirect.
    #[error("storage unavailable")]
    StorageUnavailable(anyhow::Error),
    #[error("internal error")]
    Internal(anyhow::Error),
}

impl AppError {
    /// Generic login-failure marker shared by unknown-identifier and
    /// wrong-password outcomes. Never reveals which one happened.
    pub const INVALID_MARKER: &'static str = "invalid";
    pub const INACTIVE_MARKER: &'static str = "inactive";
    pub const TIMEOUT_MARKER: &'static str = "timeout";
    pub const ACCESS_DENIED_MARKER: &'static str = "access_denied";
}

fn redirect(location: String) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, location)],
    )
        .into_response()
}

fn login_redirect_with_error(marker: &str) -> Response {
    redirect(format!("{}?error={}", LOGIN_PATH, marker))
}

fn json_error(status: StatusCode, message: &str, code: &str, details: Option<Value>) -> Response {
    let body = Json(ErrorResponse {
        error: message.to_string(),
        code: code.to_string(),
        details,
    });
    (status, body).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthenticated { next } => {
                let location = match next {
                    Some(path) => {
                        let query = url::form_urlencoded::Serializer::new(String::new())
                            .append_pair("next", &path)
                            .finish();
                        format!("{}?{}", LOGIN_PATH, query)
                    }
                    None => LOGIN_PATH.to_string(),
                };
                redirect(location)
            }
            AppError::InvalidCredentials => login_redirect_with_error(Self::INVALID_MARKER),
            AppError::AccountInactive => login_redirect_with_error(Self::INACTIVE_MARKER),
            AppError::SessionExpired => login_redirect_with_error(Self::TIMEOUT_MARKER),
            AppError::AccessDenied => redirect(format!(
                "{}?error={}",
                DASHBOARD_PATH,
                Self::ACCESS_DENIED_MARKER
            )),
            AppError::CsrfRejected => json_error(
                StatusCode::FORBIDDEN,
                "Invalid or missing CSRF token",
                "CSRF_REJECTED",
                None,
            ),
            AppError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, &msg, "NOT_FOUND", None),
            AppError::BadRequest(msg) => {
                json_error(StatusCode::BAD_REQUEST, &msg, "BAD_REQUEST", None)
            }
            AppError::Validation(errors) => json_error(
                StatusCode::BAD_REQUEST,
                "Validation failed",
                "VALIDATION_ERROR",
                Some(serde_json::json!({ "errors": errors })),
            ),
            AppError::StorageUnavailable(err) => {
                tracing::error!("Backing store unavailable: {:?}", err);
                json_error(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable",
                    "STORAGE_UNAVAILABLE",
                    None,
                )
            }
            AppError::Internal(err) => {
                tracing::error!("Internal server error: {:?}", err);
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "INTERNAL_SERVER_ERROR",
                    None,
                )
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter()
                    .map(move |e| format!("{}: {}", field, e.code.as_ref()))
            })
            .collect();
        AppError::Validation(messages)
    }
}
