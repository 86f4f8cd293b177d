mod support;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

use support::{
    body_json, build_env, location, login, login_for_cookie, login_with_next, seed_accounts,
    session_cookie, ADMIN_PASSWORD, CUSTOMER_PASSWORD,
};

#[tokio::test]
async fn admin_login_succeeds_and_redirects_to_admin_landing() {
    let env = build_env(&seed_accounts());

    let response = login(&env.app, "admin", ADMIN_PASSWORD).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie set")
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("aeims_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    assert_eq!(env.sessions.len(), 1);
    let attempts = env.audit.attempts();
    assert_eq!(attempts.len(), 1);
    assert!(attempts[0].success);
    assert_eq!(attempts[0].identifier, "admin");
    assert_eq!(attempts[0].ip.as_deref(), Some("203.0.113.9"));
}

#[tokio::test]
async fn customer_login_accepts_form_encoded_bodies() {
    let env = build_env(&seed_accounts());

    let response = env
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!(
                    "identifier=demo%40example.com&password={}",
                    CUSTOMER_PASSWORD.replace('!', "%21")
                )))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    assert!(session_cookie(&response).is_some());
}

#[tokio::test]
async fn wrong_password_redirects_with_generic_marker_and_audits_failure() {
    let env = build_env(&seed_accounts());

    let response = login(&env.app, "demo@example.com", "wrongpass").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?error=invalid");
    assert!(session_cookie(&response).is_none());
    assert_eq!(env.sessions.len(), 0);

    let attempts = env.audit.attempts();
    assert_eq!(attempts.len(), 1);
    assert!(!attempts[0].success);
    assert_eq!(attempts[0].identifier, "demo@example.com");
}

#[tokio::test]
async fn unknown_identifier_is_indistinguishable_from_wrong_password() {
    let env = build_env(&seed_accounts());

    let unknown = login(&env.app, "nobody@example.com", "whatever").await;
    let wrong = login(&env.app, "demo@example.com", "wrongpass").await;

    assert_eq!(location(&unknown), location(&wrong));
}

#[tokio::test]
async fn login_is_case_insensitive_on_the_identifier() {
    let env = build_env(&seed_accounts());

    let response = login(&env.app, "DEMO@EXAMPLE.COM", CUSTOMER_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn login_honors_a_safe_next_path() {
    let env = build_env(&seed_accounts());

    let response =
        login_with_next(&env.app, "admin", ADMIN_PASSWORD, Some("/admin/accounts")).await;
    assert_eq!(location(&response), "/admin/accounts");
}

#[tokio::test]
async fn login_ignores_offsite_next_targets() {
    let env = build_env(&seed_accounts());

    let response = login_with_next(
        &env.app,
        "admin",
        ADMIN_PASSWORD,
        Some("//evil.example.com/phish"),
    )
    .await;
    assert_eq!(location(&response), "/admin");
}

#[tokio::test]
async fn suspended_operator_cannot_login() {
    let env = build_env(&seed_accounts());

    let response = login(&env.app, "operator2", support::OPERATOR_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?error=inactive");
    assert_eq!(env.sessions.len(), 0);
}

#[tokio::test]
async fn logout_destroys_the_session_and_clears_the_cookie() {
    let env = build_env(&seed_accounts());
    let cookie = login_for_cookie(&env.app, "demo", CUSTOMER_PASSWORD).await;
    let token = support::csrf_token_for(&env.app, &cookie).await;
    assert_eq!(env.sessions.len(), 1);

    let response = env
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header(header::COOKIE, cookie.as_str())
                .header("x-csrf-token", token)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?logged_out=1");
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cleared.contains("Max-Age=0"));
    assert_eq!(env.sessions.len(), 0);

    // The old cookie is now a stale cookie: fresh not-logged-in treatment.
    let after = support::get_with_cookie(&env.app, "/dashboard", &cookie).await;
    assert_eq!(after.status(), StatusCode::SEE_OTHER);
    assert!(location(&after).starts_with("/login?next="));
}

#[tokio::test]
async fn login_form_renders_generic_messages_for_markers() {
    let env = build_env(&seed_accounts());

    let response = env
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/login?error=invalid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid username or password");
}

#[tokio::test]
async fn unreachable_credential_store_is_a_hard_503() {
    let env = build_env(&seed_accounts());
    // Simulate the backing store going away mid-flight.
    let accounts_path = env.dir.path().join("accounts.json");
    std::fs::remove_file(&accounts_path).expect("remove accounts file");

    let response = login(&env.app, "admin", ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "STORAGE_UNAVAILABLE");
}
