use std::env;
use std::path::PathBuf;

use anyhow::anyhow;

use crate::utils::cookies::{CookieOptions, SameSite};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Which credential backend serves account lookups. Both expose identical
/// semantics; the choice is purely operational.
pub enum CredentialBackend {
    /// Accounts file on disk (JSON array of account records).
    Json { path: PathBuf },
    /// PostgreSQL `accounts` table.
    Postgres,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credential_backend: CredentialBackend,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub redis_pool_size: u32,
    pub redis_connect_timeout: u64,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    pub audit_log_path: PathBuf,
    pub rate_limit_ip_max_requests: u32,
    pub rate_limit_ip_window_seconds: u64,
    pub cors_allow_origins: Vec<String>,
    pub production_mode: bool,
    pub port: u16,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok();

        let backend_name =
            env::var("CREDENTIAL_BACKEND").unwrap_or_else(|_| "json".to_string());
        let credential_backend = match backend_name.to_ascii_lowercase().as_str() {
            "json" => CredentialBackend::Json {
                path: env::var("CREDENTIAL_FILE")
                    .unwrap_or_else(|_| "./accounts.json".to_string())
                    .into(),
            },
            "postgres" => {
                if database_url.is_none() {
                    return Err(anyhow!(
                        "CREDENTIAL_BACKEND=postgres requires DATABASE_URL"
                    ));
                }
                CredentialBackend::Postgres
            }
            other => return Err(anyhow!("Invalid CREDENTIAL_BACKEND value: {}", other)),
        };

        let production_mode = parse_bool(env::var("PRODUCTION_MODE").ok(), false);

        let cookie_same_site = match env::var("SESSION_COOKIE_SAMESITE")
            .unwrap_or_else(|_| "lax".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "lax" => SameSite::Lax,
            "strict" => SameSite::Strict,
            "none" => SameSite::None,
            other => return Err(anyhow!("Invalid SESSION_COOKIE_SAMESITE value: {}", other)),
        };

        Ok(Config {
            credential_backend,
            database_url,
            redis_url: env::var("REDIS_URL").ok(),
            redis_pool_size: parse_or(env::var("REDIS_POOL_SIZE").ok(), 5),
            redis_connect_timeout: parse_or(env::var("REDIS_CONNECT_TIMEOUT").ok(), 5),
            // Secure cookies are always on in production mode.
            cookie_secure: parse_bool(env::var("SESSION_COOKIE_SECURE").ok(), production_mode),
            cookie_same_site,
            audit_log_path: env::var("AUDIT_LOG_PATH")
                .unwrap_or_else(|_| "./auth_audit.log".to_string())
                .into(),
            rate_limit_ip_max_requests: parse_or(env::var("RATE_LIMIT_IP_MAX_REQUESTS").ok(), 10),
            rate_limit_ip_window_seconds: parse_or(
                env::var("RATE_LIMIT_IP_WINDOW_SECONDS").ok(),
                60,
            ),
            cors_allow_origins: env::var("CORS_ALLOW_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            production_mode,
            port: parse_or(env::var("PORT").ok(), 3000),
        })
    }

    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            secure: self.cookie_secure || self.production_mode,
            same_site: self.cookie_same_site,
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|value| value.parse().ok()).unwrap_or(default)
}

fn parse_bool(raw: Option<String>, default: bool) -> bool {
    match raw.as_deref() {
        Some(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        None => default,
    }
}
