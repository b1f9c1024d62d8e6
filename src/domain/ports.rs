use super::account::{Account, AccountId};
use super::transfer::{Transfer, TransferId};
use crate::error::Result;
use async_trait::async_trait;

/// Storage for accounts.
///
/// `save` is an upsert: an account without an id is inserted and receives
/// one, an account with an id replaces the stored record only if its
/// `version` still matches the stored one.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find(&self, id: AccountId) -> Result<Option<Account>>;
    async fn save(&self, account: Account) -> Result<Account>;
    async fn delete(&self, id: AccountId) -> Result<bool>;
    async fn all(&self) -> Result<Vec<Account>>;
}

/// Append-mostly storage for transfer attempts.
#[async_trait]
pub trait TransferStore: Send + Sync {
    async fn save(&self, transfer: Transfer) -> Result<Transfer>;
    async fn find(&self, id: TransferId) -> Result<Option<Transfer>>;
    async fn all(&self) -> Result<Vec<Transfer>>;
    /// Transfers debiting `account_id`, most recent first.
    async fn by_source(&self, account_id: AccountId) -> Result<Vec<Transfer>>;
}

pub type AccountStoreBox = Box<dyn AccountStore>;
pub type TransferStoreBox = Box<dyn TransferStore>;
