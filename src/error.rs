use crate::domain::account::AccountId;
use crate::domain::transfer::{RejectionReason, TransferId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BankError {
    #[error("Account with ID {0} not found")]
    AccountNotFound(AccountId),
    #[error("Transfer with ID {0} not found")]
    TransferNotFound(TransferId),
    #[error(
        "Transfer from account {from_account_id} to account {to_account_id} was rejected: {reason}"
    )]
    TransferRejected {
        from_account_id: AccountId,
        to_account_id: AccountId,
        reason: RejectionReason,
    },
    #[error("Invalid {field}: {message}")]
    InvalidAccountData {
        field: &'static str,
        message: &'static str,
    },
    #[error("Account number {0} is already in use")]
    DuplicateAccountNumber(String),
    #[error("Account {0} was modified concurrently")]
    ConcurrentModification(AccountId),
    #[error("Unexpected error while executing transfer")]
    TransferFailed {
        /// Id of the PENDING record left behind, if it could be written.
        transfer_id: Option<TransferId>,
        #[source]
        source: Box<BankError>,
    },
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl BankError {
    pub fn internal(message: impl Into<String>) -> Self {
        BankError::InternalError(Box::new(std::io::Error::other(message.into())))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for BankError {
    fn from(err: rocksdb::Error) -> Self {
        BankError::InternalError(Box::new(err))
    }
}

impl From<serde_json::Error> for BankError {
    fn from(err: serde_json::Error) -> Self {
        BankError::InternalError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, BankError>;
