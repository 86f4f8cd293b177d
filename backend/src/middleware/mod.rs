pub mod auth;
pub mod csrf;
pub mod rate_limit;
pub mod request_id;

pub use auth::{auth, auth_admin, auth_operator, auth_reseller};
pub use csrf::{csrf_protect, CSRF_HEADER};
pub use rate_limit::create_login_rate_limiter;
pub use request_id::{request_id, RequestId};
