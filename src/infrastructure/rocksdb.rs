use super::{most_recent_first, prepare_account_write};
use crate::domain::account::{Account, AccountId};
use crate::domain::ports::{AccountStore, TransferStore};
use crate::domain::transfer::{Transfer, TransferId};
use crate::error::{BankError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing accounts.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family for storing transfer records.
pub const CF_TRANSFERS: &str = "transfers";
/// Column Family for id sequences.
pub const CF_META: &str = "meta";

const ACCOUNT_SEQ: &[u8] = b"account_seq";
const TRANSFER_SEQ: &[u8] = b"transfer_seq";
const NUMBER_INDEX_PREFIX: &str = "account_number:";

/// A persistent store implementation using RocksDB.
///
/// Accounts and transfers live in separate Column Families keyed by their
/// big-endian id, so iteration yields records in id order. Id sequences and the
/// account-number index live in `meta` and are written in the same
/// `WriteBatch` as the record they describe.
///
/// Writes are serialized through an async mutex: the version check and
/// uniqueness check of an account save must see the same state as the write.
/// `Clone` shares the underlying `Arc<DB>` and the write lock.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_ACCOUNTS, CF_TRANSFERS, CF_META]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| BankError::internal(format!("{name} column family not found")))
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, id: i64) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan_json<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }

    /// Reads an id stored as a big-endian value in the meta Column Family.
    fn read_id(&self, key: &[u8]) -> Result<Option<i64>> {
        let cf = self.cf(CF_META)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| BankError::internal("corrupt id in meta column family"))?;
                Ok(Some(i64::from_be_bytes(raw)))
            }
            None => Ok(None),
        }
    }

    fn last_id(&self, seq_key: &[u8]) -> Result<i64> {
        Ok(self.read_id(seq_key)?.unwrap_or(0))
    }

    fn put_json<T: Serialize>(
        &self,
        batch: &mut WriteBatch,
        cf_name: &str,
        id: i64,
        record: &T,
    ) -> Result<()> {
        batch.put_cf(self.cf(cf_name)?, id.to_be_bytes(), serde_json::to_vec(record)?);
        Ok(())
    }
}

/// Key of the `meta` entry mapping an account number to its account id.
fn number_key(account_number: &str) -> Vec<u8> {
    format!("{NUMBER_INDEX_PREFIX}{account_number}").into_bytes()
}

#[async_trait]
impl AccountStore for RocksDBStore {
    async fn find(&self, id: AccountId) -> Result<Option<Account>> {
        self.get_json(CF_ACCOUNTS, id)
    }

    async fn save(&self, account: Account) -> Result<Account> {
        let _guard = self.write_lock.lock().await;

        let stored: Option<Account> = match account.id {
            Some(id) => self.get_json(CF_ACCOUNTS, id)?,
            None => None,
        };
        match self.read_id(&number_key(&account.account_number))? {
            Some(owner) if Some(owner) != account.id => {
                return Err(BankError::DuplicateAccountNumber(account.account_number));
            }
            _ => {}
        }

        let is_insert = account.id.is_none();
        let next_id = self.last_id(ACCOUNT_SEQ)? + 1;
        let account = prepare_account_write(account, stored.as_ref(), || next_id)?;
        let id = account.persisted_id()?;

        let meta = self.cf(CF_META)?;
        let mut batch = WriteBatch::default();
        self.put_json(&mut batch, CF_ACCOUNTS, id, &account)?;
        if is_insert {
            batch.put_cf(meta, ACCOUNT_SEQ, id.to_be_bytes());
        }
        if let Some(previous) = stored.filter(|s| s.account_number != account.account_number) {
            batch.delete_cf(meta, number_key(&previous.account_number));
        }
        batch.put_cf(meta, number_key(&account.account_number), id.to_be_bytes());
        self.db.write(batch)?;
        Ok(account)
    }

    async fn delete(&self, id: AccountId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let Some(stored) = self.get_json::<Account>(CF_ACCOUNTS, id)? else {
            return Ok(false);
        };

        let mut batch = WriteBatch::default();
        batch.delete_cf(self.cf(CF_ACCOUNTS)?, id.to_be_bytes());
        batch.delete_cf(self.cf(CF_META)?, number_key(&stored.account_number));
        self.db.write(batch)?;
        Ok(true)
    }

    async fn all(&self) -> Result<Vec<Account>> {
        self.scan_json(CF_ACCOUNTS)
    }
}

#[async_trait]
impl TransferStore for RocksDBStore {
    async fn save(&self, mut transfer: Transfer) -> Result<Transfer> {
        let _guard = self.write_lock.lock().await;

        let seq = match transfer.id {
            Some(_) => None,
            None => {
                transfer.id = Some(self.last_id(TRANSFER_SEQ)? + 1);
                Some(TRANSFER_SEQ)
            }
        };
        let id = transfer
            .id
            .ok_or_else(|| BankError::internal("transfer id was not assigned"))?;

        let mut batch = WriteBatch::default();
        self.put_json(&mut batch, CF_TRANSFERS, id, &transfer)?;
        if let Some(seq_key) = seq {
            batch.put_cf(self.cf(CF_META)?, seq_key, id.to_be_bytes());
        }
        self.db.write(batch)?;
        Ok(transfer)
    }

    async fn find(&self, id: TransferId) -> Result<Option<Transfer>> {
        self.get_json(CF_TRANSFERS, id)
    }

    async fn all(&self) -> Result<Vec<Transfer>> {
        self.scan_json(CF_TRANSFERS)
    }

    async fn by_source(&self, account_id: AccountId) -> Result<Vec<Transfer>> {
        let mut matching: Vec<Transfer> = self
            .scan_json::<Transfer>(CF_TRANSFERS)?
            .into_iter()
            .filter(|t| t.from_account_id == account_id)
            .collect();
        most_recent_first(&mut matching);
        Ok(matching)
    }
}
