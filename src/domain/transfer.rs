use crate::domain::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type TransferId = i64;

/// Outcome of a transfer attempt.
///
/// `Pending` is the initial state. It is only persisted when settlement is
/// interrupted by an unexpected fault; `Completed` and `Rejected` are terminal.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferStatus {
    #[default]
    Pending,
    Completed,
    Rejected,
}

/// Business rule that caused a transfer to be rejected.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum RejectionReason {
    #[error("Invalid amount")]
    InvalidAmount,
    #[error("Insufficient funds")]
    InsufficientFunds,
    #[error("Source and destination accounts must differ")]
    SameAccount,
    #[error("Destination balance limit exceeded")]
    BalanceOverflow,
}

/// A request to move `amount` from one account to another.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Option<Decimal>,
}

impl TransferRequest {
    pub fn new(from_account_id: AccountId, to_account_id: AccountId, amount: Decimal) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount: Some(amount),
        }
    }
}

/// A recorded transfer attempt.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: Option<TransferId>,
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Option<Decimal>,
    pub transfer_date: DateTime<Utc>,
    pub status: TransferStatus,
}

impl Transfer {
    pub fn pending(request: &TransferRequest) -> Self {
        Self {
            id: None,
            from_account_id: request.from_account_id,
            to_account_id: request.to_account_id,
            amount: request.amount,
            transfer_date: Utc::now(),
            status: TransferStatus::Pending,
        }
    }

    pub fn complete(&mut self) {
        self.status = TransferStatus::Completed;
    }

    pub fn reject(&mut self) {
        self.status = TransferStatus::Rejected;
    }
}
