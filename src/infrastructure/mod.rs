//! Storage adapters implementing the domain ports.

use crate::domain::account::{Account, AccountId};
use crate::domain::transfer::Transfer;
use crate::error::{BankError, Result};
use chrono::Utc;

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

/// Stamps an account for writing.
///
/// `stored` is the current record for `account.id` (ignored on insert). The
/// caller must hold whatever lock makes the read of `stored` and the following
/// write a single step.
pub(crate) fn prepare_account_write(
    mut account: Account,
    stored: Option<&Account>,
    next_id: impl FnOnce() -> AccountId,
) -> Result<Account> {
    let now = Utc::now();
    match account.id {
        Some(id) => {
            let stored = stored.ok_or(BankError::AccountNotFound(id))?;
            if stored.version != account.version {
                return Err(BankError::ConcurrentModification(id));
            }
            account.created_at = stored.created_at;
        }
        None => {
            account.id = Some(next_id());
            account.created_at = now;
        }
    }
    account.updated_at = now;
    account.version += 1;
    Ok(account)
}

pub(crate) fn ensure_unique_number<'a>(
    account: &Account,
    mut existing: impl Iterator<Item = &'a Account>,
) -> Result<()> {
    if existing.any(|other| other.account_number == account.account_number && other.id != account.id) {
        Err(BankError::DuplicateAccountNumber(account.account_number.clone()))
    } else {
        Ok(())
    }
}

pub(crate) fn most_recent_first(transfers: &mut [Transfer]) {
    transfers.sort_by(|a, b| {
        b.transfer_date
            .cmp(&a.transfer_date)
            .then_with(|| b.id.cmp(&a.id))
    });
}
