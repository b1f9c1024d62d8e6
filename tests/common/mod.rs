#![allow(dead_code)]

use async_trait::async_trait;
use bankapi::application::executor::TransferExecutor;
use bankapi::domain::account::{Account, AccountId, Balance};
use bankapi::domain::ports::{AccountStore, TransferStore};
use bankapi::domain::transfer::Transfer;
use bankapi::error::{BankError, Result};
use bankapi::infrastructure::in_memory::{InMemoryAccountStore, InMemoryTransferStore};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Account store that counts saves and can be told to misbehave.
#[derive(Clone, Default)]
pub struct InstrumentedAccountStore {
    inner: InMemoryAccountStore,
    saves: Arc<AtomicUsize>,
    /// Number of successful saves allowed before every further save fails.
    fail_after: Arc<std::sync::Mutex<Option<usize>>>,
    /// Number of upcoming saves that report a concurrent modification.
    conflicts: Arc<AtomicUsize>,
}

impl InstrumentedAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_after(&self, successful_saves: usize) {
        *self.fail_after.lock().unwrap() = Some(successful_saves);
    }

    pub fn inject_conflicts(&self, count: usize) {
        self.conflicts.store(count, Ordering::SeqCst);
    }

    pub async fn seed(&self, number: &str, balance: Decimal) -> AccountId {
        let account = self
            .inner
            .save(Account::new(number, Balance::new(balance)))
            .await
            .unwrap();
        account.id.unwrap()
    }

    pub async fn balance(&self, id: AccountId) -> Decimal {
        self.inner.find(id).await.unwrap().unwrap().balance.0
    }
}

#[async_trait]
impl AccountStore for InstrumentedAccountStore {
    async fn find(&self, id: AccountId) -> Result<Option<Account>> {
        self.inner.find(id).await
    }

    async fn save(&self, account: Account) -> Result<Account> {
        let attempt = self.saves.fetch_add(1, Ordering::SeqCst);
        let limit = *self.fail_after.lock().unwrap();
        if limit.is_some_and(|limit| attempt >= limit) {
            return Err(BankError::internal("storage unavailable"));
        }
        let pending_conflicts = self.conflicts.load(Ordering::SeqCst);
        if pending_conflicts > 0 {
            self.conflicts.store(pending_conflicts - 1, Ordering::SeqCst);
            if let Some(id) = account.id {
                return Err(BankError::ConcurrentModification(id));
            }
        }
        self.inner.save(account).await
    }

    async fn delete(&self, id: AccountId) -> Result<bool> {
        self.inner.delete(id).await
    }

    async fn all(&self) -> Result<Vec<Account>> {
        self.inner.all().await
    }
}

/// Transfer store whose writes always fail, remembering what was attempted.
#[derive(Clone, Default)]
pub struct BrokenTransferStore {
    attempts: Arc<std::sync::Mutex<Vec<Transfer>>>,
}

impl BrokenTransferStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> Vec<Transfer> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransferStore for BrokenTransferStore {
    async fn save(&self, transfer: Transfer) -> Result<Transfer> {
        self.attempts.lock().unwrap().push(transfer);
        Err(BankError::internal("transfer table unavailable"))
    }

    async fn find(&self, _id: i64) -> Result<Option<Transfer>> {
        Ok(None)
    }

    async fn all(&self) -> Result<Vec<Transfer>> {
        Ok(Vec::new())
    }

    async fn by_source(&self, _account_id: AccountId) -> Result<Vec<Transfer>> {
        Ok(Vec::new())
    }
}

pub fn executor(
    accounts: &InstrumentedAccountStore,
    transfers: &InMemoryTransferStore,
) -> TransferExecutor {
    TransferExecutor::new(Box::new(accounts.clone()), Box::new(transfers.clone()))
}
