pub mod audit_log;
pub mod authenticator;
pub mod csrf;

pub use audit_log::{AuditLogServiceTrait, FileAuditLog, MemoryAuditLog, PgAuditLog};
pub use authenticator::{AttemptContext, Authenticator};
