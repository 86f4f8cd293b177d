use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aeims_backend::{
    config::{Config, CredentialBackend},
    db::{connection::create_pool, redis::create_redis_pool},
    repositories::{
        CredentialStore, JsonCredentialStore, MemorySessionStore, PgCredentialStore,
        RedisSessionStore, SessionStore,
    },
    routes::build_router,
    services::{AuditLogServiceTrait, FileAuditLog, PgAuditLog},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aeims_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        credential_backend = match &config.credential_backend {
            CredentialBackend::Json { .. } => "json",
            CredentialBackend::Postgres => "postgres",
        },
        redis = config.redis_url.is_some(),
        production_mode = config.production_mode,
        port = config.port,
        "Loaded configuration from environment/.env"
    );

    // Credential store and audit sink follow the configured backend.
    let (credentials, audit): (Arc<dyn CredentialStore>, Arc<dyn AuditLogServiceTrait>) =
        match &config.credential_backend {
            CredentialBackend::Json { path } => (
                Arc::new(JsonCredentialStore::new(path.clone())),
                Arc::new(FileAuditLog::new(config.audit_log_path.clone())),
            ),
            CredentialBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required"))?;
                let pool = create_pool(url).await?;
                sqlx::migrate!("./migrations").run(pool.as_ref()).await?;
                (
                    Arc::new(PgCredentialStore::new(pool.clone())),
                    Arc::new(PgAuditLog::new(pool)),
                )
            }
        };

    // Sessions live in Redis when configured, in-process otherwise.
    let sessions: Arc<dyn SessionStore> = match create_redis_pool(&config).await? {
        Some(pool) => Arc::new(RedisSessionStore::new(pool)),
        None => Arc::new(MemorySessionStore::new()),
    };

    let state = AppState::new(credentials, sessions, audit, config.clone());
    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
