use crate::domain::account::{Account, AccountDraft, AccountId, Balance};
use crate::domain::ports::AccountStoreBox;
use crate::error::{BankError, Result};
use tracing::info;

/// Account management on top of an [`AccountStore`](crate::domain::ports::AccountStore).
pub struct AccountService {
    accounts: AccountStoreBox,
}

impl AccountService {
    pub fn new(accounts: AccountStoreBox) -> Self {
        Self { accounts }
    }

    pub async fn create(&self, draft: AccountDraft) -> Result<Account> {
        let (account_number, balance) = draft.validate()?;
        let account = self
            .accounts
            .save(Account::new(account_number, balance))
            .await?;
        info!(account_id = ?account.id, "Account created");
        Ok(account)
    }

    pub async fn get(&self, id: AccountId) -> Result<Account> {
        self.accounts
            .find(id)
            .await?
            .ok_or(BankError::AccountNotFound(id))
    }

    /// Replaces number and balance of an existing account.
    ///
    /// Existence is checked before the draft is validated.
    pub async fn update(&self, id: AccountId, draft: AccountDraft) -> Result<Account> {
        let mut account = self.get(id).await?;
        let (account_number, balance) = draft.validate()?;
        account.account_number = account_number;
        account.balance = balance;

        let account = self.accounts.save(account).await?;
        info!(account_id = id, "Account updated");
        Ok(account)
    }

    pub async fn delete(&self, id: AccountId) -> Result<()> {
        if self.accounts.delete(id).await? {
            info!(account_id = id, "Account deleted");
            Ok(())
        } else {
            Err(BankError::AccountNotFound(id))
        }
    }

    pub async fn list(&self) -> Result<Vec<Account>> {
        self.accounts.all().await
    }

    pub async fn balance(&self, id: AccountId) -> Result<Balance> {
        Ok(self.get(id).await?.balance)
    }
}
