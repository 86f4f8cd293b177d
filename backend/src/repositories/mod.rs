pub mod credential;
pub mod credential_json;
pub mod credential_postgres;
pub mod session;
pub mod session_memory;
pub mod session_redis;

pub use credential::CredentialStore;
pub use credential_json::JsonCredentialStore;
pub use credential_postgres::PgCredentialStore;
pub use session::SessionStore;
pub use session_memory::MemorySessionStore;
pub use session_redis::RedisSessionStore;
