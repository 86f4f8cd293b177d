//! Router assembly, shared between `main` and the integration tests.

use axum::{
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::Config, handlers, middleware as guard, state::AppState};

pub fn build_router(state: AppState) -> Router {
    // Public routes: the login entry point and the login action. The login
    // action is per-IP rate limited (0 max requests disables the limiter,
    // which the in-process tests rely on since there is no peer address).
    let mut login_action = Router::new().route("/auth/login", post(handlers::auth::login));
    if state.config.rate_limit_ip_max_requests > 0 {
        login_action = login_action.route_layer(guard::create_login_rate_limiter(&state.config));
    }
    let public_routes = Router::new()
        .route("/login", get(handlers::auth::login_form))
        .merge(login_action);

    // Routes open to any authenticated session.
    let user_routes = Router::new()
        .route("/dashboard", get(handlers::dashboard::dashboard))
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/csrf", get(handlers::auth::csrf_token))
        .route("/auth/logout", post(handlers::auth::logout))
        // Layer order matters: the guard must run before the CSRF check so
        // the session extension is present.
        .route_layer(axum_middleware::from_fn(guard::csrf_protect))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            guard::auth,
        ));

    // Admin-only routes (auth + admin role).
    let admin_routes = Router::new()
        .route("/admin", get(handlers::dashboard::admin_home))
        .route(
            "/admin/accounts",
            get(handlers::admin::list_accounts).post(handlers::admin::create_account),
        )
        .route(
            "/admin/accounts/{id}/status",
            put(handlers::admin::update_account_status),
        )
        .route(
            "/admin/accounts/{id}/sessions",
            delete(handlers::admin::revoke_account_sessions),
        )
        .route_layer(axum_middleware::from_fn(guard::csrf_protect))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            guard::auth_admin,
        ));

    let operator_routes = Router::new()
        .route("/operator", get(handlers::dashboard::operator_home))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            guard::auth_operator,
        ));

    let reseller_routes = Router::new()
        .route("/reseller", get(handlers::dashboard::reseller_home))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            guard::auth_reseller,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .merge(operator_routes)
        .merge(reseller_routes)
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(guard::request_id))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(24 * 60 * 60));

    if config.cors_allow_origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allow_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
