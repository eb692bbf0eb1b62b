use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::ports::PurchaseStore;
use crate::domain::purchase::{Purchase, PurchasePatch};
use crate::error::{PaymentError, Result};

/// Column family for purchase rows, keyed by payment id.
pub const CF_PURCHASES: &str = "purchases";

/// Persistent purchase store backed by RocksDB.
///
/// Rows are JSON-encoded and keyed by `payment_id`, so the key space itself
/// carries the uniqueness constraint. RocksDB has no conditional insert, so
/// the existence check and the put run under an internal mutex. That pair
/// is the store's atomic unit, same as the in-memory write lock.
///
/// `Clone` shares the underlying `Arc<DB>` and the write mutex.
#[derive(Clone)]
pub struct RocksDbPurchaseStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDbPurchaseStore {
    /// Opens or creates the database at `path`, ensuring the purchases
    /// column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_purchases = ColumnFamilyDescriptor::new(CF_PURCHASES, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_purchases])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(CF_PURCHASES)
            .ok_or_else(|| PaymentError::Storage("purchases column family not found".to_string()))
    }

    fn read(&self, payment_id: &str) -> Result<Option<Purchase>> {
        let cf = self.cf()?;
        match self.db.get_cf(cf, payment_id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, purchase: &Purchase) -> Result<()> {
        let cf = self.cf()?;
        let value = serde_json::to_vec(purchase)?;
        self.db.put_cf(cf, purchase.payment_id.as_bytes(), value)?;
        Ok(())
    }
}

impl From<rocksdb::Error> for PaymentError {
    fn from(err: rocksdb::Error) -> Self {
        PaymentError::Storage(err.to_string())
    }
}

#[async_trait]
impl PurchaseStore for RocksDbPurchaseStore {
    async fn insert(&self, purchase: Purchase) -> Result<Purchase> {
        let _guard = self.write_lock.lock().await;
        if self.read(&purchase.payment_id)?.is_some() {
            return Err(PaymentError::DuplicatePaymentId(purchase.payment_id));
        }
        self.write(&purchase)?;
        Ok(purchase)
    }

    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Purchase>> {
        self.read(payment_id)
    }

    async fn update_by_payment_id(
        &self,
        payment_id: &str,
        patch: PurchasePatch,
    ) -> Result<Option<Purchase>> {
        let _guard = self.write_lock.lock().await;
        match self.read(payment_id)? {
            Some(mut purchase) => {
                purchase.apply(patch, Utc::now());
                self.write(&purchase)?;
                Ok(Some(purchase))
            }
            None => Ok(None),
        }
    }

    async fn all(&self) -> Result<Vec<Purchase>> {
        let cf = self.cf()?;
        let mut purchases = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            purchases.push(serde_json::from_slice(&value)?);
        }
        Ok(purchases)
    }
}
