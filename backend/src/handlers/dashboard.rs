//! Role landing endpoints. The guards have already granted by the time any
//! of these run; they only describe the landing context.

use axum::{extract::Extension, Json};
use serde_json::{json, Value};

use crate::models::session::Session;

/// Generic dashboard, reachable by any authenticated session. Role-denied
/// redirects land here carrying the `access_denied` marker.
pub async fn dashboard(Extension(session): Extension<Session>) -> Json<Value> {
    landing("dashboard", &session)
}

pub async fn admin_home(Extension(session): Extension<Session>) -> Json<Value> {
    landing("admin", &session)
}

pub async fn operator_home(Extension(session): Extension<Session>) -> Json<Value> {
    landing("operator", &session)
}

pub async fn reseller_home(Extension(session): Extension<Session>) -> Json<Value> {
    landing("reseller", &session)
}

fn landing(section: &str, session: &Session) -> Json<Value> {
    Json(json!({
        "section": section,
        "account_id": session.account_id,
        "role": session.role,
    }))
}
