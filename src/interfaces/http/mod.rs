//! REST surface over accounts and transfers.

pub mod error;
pub mod handlers;

use crate::application::accounts::AccountService;
use crate::application::executor::TransferExecutor;
use axum::{
    Router,
    routing::get,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Services shared by all handlers.
pub struct AppState {
    pub accounts: AccountService,
    pub transfers: TransferExecutor,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route(
            "/api/v1/accounts",
            get(handlers::list_accounts).post(handlers::create_account),
        )
        .route(
            "/api/v1/accounts/{id}",
            get(handlers::get_account)
                .put(handlers::update_account)
                .delete(handlers::delete_account),
        )
        .route(
            "/api/v1/transfers",
            get(handlers::list_transfers).post(handlers::create_transfer),
        )
        .route("/api/v1/transfers/{id}", get(handlers::get_transfer))
        .route(
            "/api/v1/transfers/account/{id}",
            get(handlers::transfers_by_account),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
