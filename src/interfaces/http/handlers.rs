use super::AppState;
use super::error::ApiResult;
use crate::domain::account::{Account, AccountDraft, AccountId};
use crate::domain::transfer::{Transfer, TransferId, TransferRequest};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info};

/// GET /api/v1/accounts
pub async fn list_accounts(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Account>>> {
    let accounts = state.accounts.list().await?;
    debug!(count = accounts.len(), "Listed accounts");
    Ok(Json(accounts))
}

/// POST /api/v1/accounts
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<AccountDraft>,
) -> ApiResult<(StatusCode, Json<Account>)> {
    let account = state.accounts.create(draft).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET /api/v1/accounts/{id}
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AccountId>,
) -> ApiResult<Json<Account>> {
    Ok(Json(state.accounts.get(id).await?))
}

/// PUT /api/v1/accounts/{id}
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AccountId>,
    Json(draft): Json<AccountDraft>,
) -> ApiResult<Json<Account>> {
    Ok(Json(state.accounts.update(id, draft).await?))
}

/// DELETE /api/v1/accounts/{id}
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AccountId>,
) -> ApiResult<StatusCode> {
    state.accounts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/transfers
pub async fn list_transfers(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Transfer>>> {
    Ok(Json(state.transfers.list().await?))
}

/// POST /api/v1/transfers
///
/// Responds 201 with the completed transfer. Rejected attempts are still
/// recorded and answered with 400.
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TransferRequest>,
) -> ApiResult<(StatusCode, Json<Transfer>)> {
    info!(
        from_account_id = request.from_account_id,
        to_account_id = request.to_account_id,
        "Transfer requested"
    );
    let transfer = state.transfers.execute(request).await?;
    Ok((StatusCode::CREATED, Json(transfer)))
}

/// GET /api/v1/transfers/{id}
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TransferId>,
) -> ApiResult<Json<Transfer>> {
    Ok(Json(state.transfers.get(id).await?))
}

/// GET /api/v1/transfers/account/{id}
pub async fn transfers_by_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AccountId>,
) -> ApiResult<Json<Vec<Transfer>>> {
    Ok(Json(state.transfers.by_source(id).await?))
}
