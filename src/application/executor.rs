use crate::domain::account::{Account, AccountId, Amount};
use crate::domain::ports::{AccountStoreBox, TransferStoreBox};
use crate::domain::transfer::{
    RejectionReason, Transfer, TransferId, TransferRequest, TransferStatus,
};
use crate::error::{BankError, Result};
use tracing::{error, info, warn};

pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Why settlement stopped before completing.
enum SettleError {
    Rejected(RejectionReason),
    Fault(BankError),
}

impl From<BankError> for SettleError {
    fn from(err: BankError) -> Self {
        SettleError::Fault(err)
    }
}

/// Executes transfers between accounts and records every attempt.
///
/// The executor owns its storage backends and runs each transfer to
/// completion within the calling task:
///
/// 1. Both accounts must exist, otherwise `AccountNotFound` is returned and
///    nothing is recorded.
/// 2. The amount must be present and strictly positive.
/// 3. Source and destination must differ.
/// 4. The source balance must cover the amount, and the destination must
///    be able to hold it.
///
/// Failing 2-4 records the attempt as `REJECTED` and returns
/// `TransferRejected` without touching any balance. Otherwise the source is
/// debited, the destination credited, and the attempt recorded as
/// `COMPLETED`. A storage fault after validation leaves a `PENDING` record
/// behind and is returned as `TransferFailed`.
pub struct TransferExecutor {
    accounts: AccountStoreBox,
    transfers: TransferStoreBox,
    max_retries: u32,
}

impl TransferExecutor {
    /// Creates a new `TransferExecutor` instance.
    ///
    /// # Arguments
    ///
    /// * `accounts` - The store holding account balances.
    /// * `transfers` - The store recording transfer attempts.
    pub fn new(accounts: AccountStoreBox, transfers: TransferStoreBox) -> Self {
        Self {
            accounts,
            transfers,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Sets how many times a save that lost an optimistic-concurrency race is retried.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub async fn execute(&self, request: TransferRequest) -> Result<Transfer> {
        let from = self.load(request.from_account_id).await?;
        let to = self.load(request.to_account_id).await?;

        let transfer = Transfer::pending(&request);

        let amount = match Amount::try_from(request.amount) {
            Ok(amount) => amount,
            Err(reason) => return Err(self.reject(transfer, reason).await),
        };
        if request.from_account_id == request.to_account_id {
            return Err(self.reject(transfer, RejectionReason::SameAccount).await);
        }

        match self.settle(from, to, amount).await {
            Ok(()) => self.complete(transfer).await,
            Err(SettleError::Rejected(reason)) => Err(self.reject(transfer, reason).await),
            Err(SettleError::Fault(fault)) => Err(self.record_fault(transfer, fault).await),
        }
    }

    pub async fn get(&self, id: TransferId) -> Result<Transfer> {
        self.transfers
            .find(id)
            .await?
            .ok_or(BankError::TransferNotFound(id))
    }

    pub async fn list(&self) -> Result<Vec<Transfer>> {
        self.transfers.all().await
    }

    /// Transfers originating from `account_id`, most recent first.
    pub async fn by_source(&self, account_id: AccountId) -> Result<Vec<Transfer>> {
        self.transfers.by_source(account_id).await
    }

    async fn load(&self, id: AccountId) -> Result<Account> {
        self.accounts
            .find(id)
            .await?
            .ok_or(BankError::AccountNotFound(id))
    }

    /// Moves `amount` from `from` to `to`.
    ///
    /// The funds check always runs against the most recently loaded source,
    /// so a retry after a lost race can still end in a rejection. Nothing is
    /// written before both the funds check and the destination headroom check
    /// pass.
    async fn settle(
        &self,
        mut from: Account,
        mut to: Account,
        amount: Amount,
    ) -> std::result::Result<(), SettleError> {
        let mut attempt = 0;
        loop {
            let mut debited = from.clone();
            debited.debit(amount).map_err(SettleError::Rejected)?;
            to.clone().credit(amount).map_err(SettleError::Rejected)?;
            match self.accounts.save(debited).await {
                Ok(_) => break,
                Err(BankError::ConcurrentModification(id)) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(account_id = id, attempt, "Source account changed, retrying debit");
                    from = self.load(id).await?;
                }
                Err(err) => return Err(err.into()),
            }
        }

        let mut attempt = 0;
        loop {
            let mut credited = to.clone();
            if let Err(reason) = credited.credit(amount) {
                // The source is already debited, so this is no longer a rejection.
                return Err(BankError::internal(format!(
                    "destination account {:?} cannot be credited: {reason}",
                    to.id
                ))
                .into());
            }
            match self.accounts.save(credited).await {
                Ok(_) => return Ok(()),
                Err(BankError::ConcurrentModification(id)) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(account_id = id, attempt, "Destination account changed, retrying credit");
                    to = self.load(id).await?;
                }
                Err(err) => {
                    error!(
                        from_account_id = ?from.id,
                        to_account_id = ?to.id,
                        amount = %amount.value(),
                        "Source debited but destination credit failed"
                    );
                    return Err(err.into());
                }
            }
        }
    }

    async fn complete(&self, mut transfer: Transfer) -> Result<Transfer> {
        transfer.complete();
        match self.transfers.save(transfer.clone()).await {
            Ok(saved) => {
                info!(
                    transfer_id = ?saved.id,
                    from_account_id = saved.from_account_id,
                    to_account_id = saved.to_account_id,
                    "Transfer completed"
                );
                Ok(saved)
            }
            Err(fault) => Err(self.record_fault(transfer, fault).await),
        }
    }

    /// Records the attempt as `REJECTED` and returns the error to surface.
    async fn reject(&self, mut transfer: Transfer, reason: RejectionReason) -> BankError {
        transfer.reject();
        let from_account_id = transfer.from_account_id;
        let to_account_id = transfer.to_account_id;
        match self.transfers.save(transfer.clone()).await {
            Ok(saved) => {
                warn!(
                    transfer_id = ?saved.id,
                    from_account_id,
                    to_account_id,
                    %reason,
                    "Transfer rejected"
                );
                BankError::TransferRejected {
                    from_account_id,
                    to_account_id,
                    reason,
                }
            }
            Err(fault) => self.record_fault(transfer, fault).await,
        }
    }

    /// Records the attempt as `PENDING` after an unexpected fault.
    ///
    /// A failure to write the record is logged; the original fault is what the
    /// caller receives either way.
    async fn record_fault(&self, mut transfer: Transfer, fault: BankError) -> BankError {
        transfer.status = TransferStatus::Pending;
        error!(error = %fault, "Unexpected error while executing transfer");
        let transfer_id = match self.transfers.save(transfer).await {
            Ok(saved) => saved.id,
            Err(err) => {
                error!(error = %err, "Failed to record pending transfer");
                None
            }
        };
        BankError::TransferFailed {
            transfer_id,
            source: Box::new(fault),
        }
    }
}
