#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;

use aeims_backend::{
    config::{Config, CredentialBackend},
    models::account::{Account, AccountStatus, Permissions, Role},
    repositories::{JsonCredentialStore, MemorySessionStore},
    routes::build_router,
    services::MemoryAuditLog,
    state::AppState,
    utils::{cookies::SameSite, password::hash_password},
};

pub const ADMIN_PASSWORD: &str = "AEIMSAdmin2024!SecurePass";
pub const CUSTOMER_PASSWORD: &str = "CustomerDemo2024!";
pub const OPERATOR_PASSWORD: &str = "OperatorDemo2024!";

pub struct TestEnv {
    pub app: Router,
    pub state: AppState,
    pub sessions: Arc<MemorySessionStore>,
    pub audit: Arc<MemoryAuditLog>,
    // Keeps the accounts file alive for the duration of the test.
    pub dir: TempDir,
}

pub fn account(
    username: &str,
    email: &str,
    password: &str,
    role: Role,
    status: AccountStatus,
) -> Account {
    Account {
        id: format!("id-{}", username),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: hash_password(password).expect("hash password"),
        role,
        status,
        permissions: Permissions::none(),
    }
}

/// Standard seed: one account per role, plus a suspended operator.
pub fn seed_accounts() -> Vec<Account> {
    vec![
        account(
            "admin",
            "admin@aeims.test",
            ADMIN_PASSWORD,
            Role::Admin,
            AccountStatus::Active,
        ),
        account(
            "demo",
            "demo@example.com",
            CUSTOMER_PASSWORD,
            Role::Customer,
            AccountStatus::Active,
        ),
        account(
            "operator1",
            "operator1@aeims.test",
            OPERATOR_PASSWORD,
            Role::Operator,
            AccountStatus::Active,
        ),
        account(
            "operator2",
            "operator2@aeims.test",
            OPERATOR_PASSWORD,
            Role::Operator,
            AccountStatus::Suspended,
        ),
    ]
}

pub fn test_config(accounts_path: std::path::PathBuf) -> Config {
    Config {
        credential_backend: CredentialBackend::Json {
            path: accounts_path,
        },
        database_url: None,
        redis_url: None,
        redis_pool_size: 5,
        redis_connect_timeout: 5,
        cookie_secure: false,
        cookie_same_site: SameSite::Lax,
        audit_log_path: "./auth_audit.log".into(),
        // In-process requests have no peer address, so the IP limiter is
        // disabled for these tests.
        rate_limit_ip_max_requests: 0,
        rate_limit_ip_window_seconds: 60,
        cors_allow_origins: vec![],
        production_mode: false,
        port: 0,
    }
}

pub fn build_env(accounts: &[Account]) -> TestEnv {
    let dir = tempfile::tempdir().expect("create temp dir");
    let accounts_path = dir.path().join("accounts.json");
    std::fs::write(
        &accounts_path,
        serde_json::to_vec_pretty(accounts).expect("encode accounts"),
    )
    .expect("write accounts file");

    let sessions = Arc::new(MemorySessionStore::new());
    let audit = Arc::new(MemoryAuditLog::new());
    let state = AppState::new(
        Arc::new(JsonCredentialStore::new(accounts_path.clone())),
        sessions.clone(),
        audit.clone(),
        test_config(accounts_path),
    );
    let app = build_router(state.clone());

    TestEnv {
        app,
        state,
        sessions,
        audit,
        dir,
    }
}

pub async fn login(app: &Router, identifier: &str, password: &str) -> Response<Body> {
    login_with_next(app, identifier, password, None).await
}

pub async fn login_with_next(
    app: &Router,
    identifier: &str,
    password: &str,
    next: Option<&str>,
) -> Response<Body> {
    let mut body = serde_json::json!({
        "identifier": identifier,
        "password": password,
    });
    if let Some(next) = next {
        body["next"] = next.into();
    }

    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::USER_AGENT, "aeims-tests")
                .header("x-forwarded-for", "203.0.113.9")
                .body(Body::from(body.to_string()))
                .expect("build login request"),
        )
        .await
        .expect("call login")
}

/// Logs in and returns the session cookie pair (`aeims_session=<id>`).
pub async fn login_for_cookie(app: &Router, identifier: &str, password: &str) -> String {
    let response = login(app, identifier, password).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER, "login must succeed");
    session_cookie(&response).expect("login must set the session cookie")
}

pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.split(';').next())
        .filter(|pair| pair.starts_with("aeims_session=") && !pair.ends_with('='))
        .map(|pair| pair.to_string())
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location")
}

pub async fn get_with_cookie(app: &Router, uri: &str, cookie: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("call route")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Fetches the session's CSRF token through the API.
pub async fn csrf_token_for(app: &Router, cookie: &str) -> String {
    let response = get_with_cookie(app, "/auth/csrf", cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["csrf_token"]
        .as_str()
        .expect("csrf_token field")
        .to_string()
}
