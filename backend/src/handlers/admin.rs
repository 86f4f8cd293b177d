//! Admin account management: listing, provisioning, status changes, and
//! forced logout.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        account::{Account, AccountResponse, AccountStatus, CreateAccount, UpdateAccountStatus},
        PaginatedResponse, PaginationQuery,
    },
    state::AppState,
    utils::password::hash_password,
};

pub async fn list_accounts(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<AccountResponse>>, AppError> {
    let (accounts, total) = state
        .credentials
        .list(pagination.limit(), pagination.offset())
        .await
        .map_err(AppError::StorageUnavailable)?;

    let data = accounts.into_iter().map(AccountResponse::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        total,
        pagination.limit(),
        pagination.offset(),
    )))
}

pub async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccount>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    payload.validate()?;

    let password_hash = hash_password(&payload.password).map_err(AppError::Internal)?;
    let account = Account::new(
        payload.username,
        payload.email,
        password_hash,
        payload.role,
        payload.permissions,
    );

    let inserted = state
        .credentials
        .insert(&account)
        .await
        .map_err(AppError::StorageUnavailable)?;
    if !inserted {
        return Err(AppError::BadRequest(
            "Username or email already in use".to_string(),
        ));
    }

    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

pub async fn update_account_status(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(payload): Json<UpdateAccountStatus>,
) -> Result<Json<Value>, AppError> {
    let updated = state
        .credentials
        .set_status(&account_id, payload.status)
        .await
        .map_err(AppError::StorageUnavailable)?;
    if !updated {
        return Err(AppError::NotFound("Account not found".to_string()));
    }

    // Suspension takes effect immediately: the account's live sessions are
    // revoked rather than left to coast on their cached role.
    let revoked_sessions = if payload.status == AccountStatus::Suspended {
        state
            .sessions
            .delete_for_account(&account_id)
            .await
            .map_err(AppError::StorageUnavailable)?
    } else {
        0
    };

    Ok(Json(json!({
        "account_id": account_id,
        "status": payload.status,
        "revoked_sessions": revoked_sessions,
    })))
}

pub async fn revoke_account_sessions(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let exists = state
        .credentials
        .find_by_id(&account_id)
        .await
        .map_err(AppError::StorageUnavailable)?
        .is_some();
    if !exists {
        return Err(AppError::NotFound("Account not found".to_string()));
    }

    let revoked_sessions = state
        .sessions
        .delete_for_account(&account_id)
        .await
        .map_err(AppError::StorageUnavailable)?;

    Ok(Json(json!({
        "account_id": account_id,
        "revoked_sessions": revoked_sessions,
    })))
}
