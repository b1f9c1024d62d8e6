use super::{ensure_unique_number, most_recent_first, prepare_account_write};
use crate::domain::account::{Account, AccountId};
use crate::domain::ports::{AccountStore, TransferStore};
use crate::domain::transfer::{Transfer, TransferId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct Table<K, V> {
    rows: BTreeMap<K, V>,
    last_id: i64,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<K, V> Table<K, V> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// A thread-safe in-memory store for accounts.
///
/// The whole version-check-and-write sequence of `save` runs under the write
/// lock, so concurrent savers of the same account observe
/// `ConcurrentModification` instead of overwriting each other.
/// Clones share the same underlying table.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<Table<AccountId, Account>>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find(&self, id: AccountId) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.rows.get(&id).cloned())
    }

    async fn save(&self, account: Account) -> Result<Account> {
        let mut accounts = self.accounts.write().await;
        ensure_unique_number(&account, accounts.rows.values())?;

        let stored = account.id.and_then(|id| accounts.rows.get(&id)).cloned();
        let account = prepare_account_write(account, stored.as_ref(), || accounts.next_id())?;
        let id = account.persisted_id()?;
        accounts.rows.insert(id, account.clone());
        Ok(account)
    }

    async fn delete(&self, id: AccountId) -> Result<bool> {
        let mut accounts = self.accounts.write().await;
        Ok(accounts.rows.remove(&id).is_some())
    }

    async fn all(&self) -> Result<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.rows.values().cloned().collect())
    }
}

/// A thread-safe in-memory store for transfer records.
#[derive(Default, Clone)]
pub struct InMemoryTransferStore {
    transfers: Arc<RwLock<Table<TransferId, Transfer>>>,
}

impl InMemoryTransferStore {
    /// Creates a new, empty in-memory transfer store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransferStore for InMemoryTransferStore {
    async fn save(&self, mut transfer: Transfer) -> Result<Transfer> {
        let mut transfers = self.transfers.write().await;
        let id = match transfer.id {
            Some(id) => id,
            None => transfers.next_id(),
        };
        transfer.id = Some(id);
        transfers.rows.insert(id, transfer.clone());
        Ok(transfer)
    }

    async fn find(&self, id: TransferId) -> Result<Option<Transfer>> {
        let transfers = self.transfers.read().await;
        Ok(transfers.rows.get(&id).cloned())
    }

    async fn all(&self) -> Result<Vec<Transfer>> {
        let transfers = self.transfers.read().await;
        Ok(transfers.rows.values().cloned().collect())
    }

    async fn by_source(&self, account_id: AccountId) -> Result<Vec<Transfer>> {
        let transfers = self.transfers.read().await;
        let mut matching: Vec<Transfer> = transfers
            .rows
            .values()
            .filter(|t| t.from_account_id == account_id)
            .cloned()
            .collect();
        most_recent_first(&mut matching);
        Ok(matching)
    }
}
