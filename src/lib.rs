pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod logging;

use application::accounts::AccountService;
use application::executor::TransferExecutor;
use config::Config;
use domain::ports::{AccountStoreBox, TransferStoreBox};
use error::Result;
use infrastructure::in_memory::{InMemoryAccountStore, InMemoryTransferStore};
use interfaces::http::AppState;
use std::sync::Arc;

/// Wires the storage backend selected by `config` into the services.
pub fn build_state(config: &Config) -> Result<Arc<AppState>> {
    let (service_accounts, executor_accounts, transfers) = open_stores(config)?;

    Ok(Arc::new(AppState {
        accounts: AccountService::new(service_accounts),
        transfers: TransferExecutor::new(executor_accounts, transfers)
            .with_max_retries(config.max_retries),
    }))
}

fn open_stores(config: &Config) -> Result<(AccountStoreBox, AccountStoreBox, TransferStoreBox)> {
    match &config.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => {
            let store = infrastructure::rocksdb::RocksDBStore::open(db_path)?;
            tracing::info!(path = %db_path.display(), "Using RocksDB storage");

            // Create boxed instances for each trait
            let service_accounts: AccountStoreBox = Box::new(store.clone());
            let executor_accounts: AccountStoreBox = Box::new(store.clone());
            let transfers: TransferStoreBox = Box::new(store);
            Ok((service_accounts, executor_accounts, transfers))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(in_memory_stores())
        }
        None => Ok(in_memory_stores()),
    }
}

fn in_memory_stores() -> (AccountStoreBox, AccountStoreBox, TransferStoreBox) {
    let accounts = InMemoryAccountStore::new();
    let service_accounts: AccountStoreBox = Box::new(accounts.clone());
    let executor_accounts: AccountStoreBox = Box::new(accounts);
    let transfers: TransferStoreBox = Box::new(InMemoryTransferStore::new());
    (service_accounts, executor_accounts, transfers)
}
