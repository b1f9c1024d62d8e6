use crate::domain::transfer::RejectionReason;
use crate::error::BankError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::SubAssign;

pub type AccountId = i64;

/// Represents a monetary value held by an account.
///
/// This is a wrapper around `rust_decimal::Decimal` so that every balance
/// computation stays in exact decimal arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// Represents a strictly positive amount moved by a transfer.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, RejectionReason> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(RejectionReason::InvalidAmount)
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Option<Decimal>> for Amount {
    type Error = RejectionReason;

    /// A missing amount is rejected the same way as a non-positive one.
    fn try_from(value: Option<Decimal>) -> Result<Self, Self::Error> {
        value.ok_or(RejectionReason::InvalidAmount).and_then(Self::new)
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns `None` when the sum exceeds what a `Decimal` can hold.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// A balance-holding account.
///
/// `id` and the timestamps are owned by the store: `id` is `None` until the
/// first save, and `version` is bumped on every successful save so that
/// concurrent writers can detect lost updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Option<AccountId>,
    pub account_number: String,
    pub balance: Balance,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl Account {
    pub fn new(account_number: impl Into<String>, balance: Balance) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            account_number: account_number.into(),
            balance,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Returns the store-assigned id, failing for an account that was never saved.
    pub fn persisted_id(&self) -> Result<AccountId, BankError> {
        self.id
            .ok_or_else(|| BankError::internal("account has not been persisted"))
    }

    pub fn has_funds(&self, amount: Amount) -> bool {
        self.balance >= Balance::from(amount)
    }

    /// Removes `amount` from the balance if sufficient funds are available.
    pub fn debit(&mut self, amount: Amount) -> Result<(), RejectionReason> {
        if self.has_funds(amount) {
            self.balance -= amount.into();
            Ok(())
        } else {
            Err(RejectionReason::InsufficientFunds)
        }
    }

    /// Adds `amount` to the balance, leaving it untouched on overflow.
    pub fn credit(&mut self, amount: Amount) -> Result<(), RejectionReason> {
        self.balance = self
            .balance
            .checked_add(amount.into())
            .ok_or(RejectionReason::BalanceOverflow)?;
        Ok(())
    }
}

/// Unvalidated account fields as submitted for creation or update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDraft {
    pub account_number: Option<String>,
    pub balance: Option<Decimal>,
}

impl AccountDraft {
    pub fn new(account_number: impl Into<String>, balance: Decimal) -> Self {
        Self {
            account_number: Some(account_number.into()),
            balance: Some(balance),
        }
    }

    pub fn validate(self) -> Result<(String, Balance), BankError> {
        let account_number = match self.account_number {
            Some(number) if !number.trim().is_empty() => number,
            _ => {
                return Err(BankError::InvalidAccountData {
                    field: "account number",
                    message: "Account number cannot be null or empty",
                });
            }
        };
        match self.balance.map(Balance::new) {
            Some(balance) if !balance.is_negative() => Ok((account_number, balance)),
            _ => Err(BankError::InvalidAccountData {
                field: "account balance",
                message: "Balance must be non-negative",
            }),
        }
    }
}
