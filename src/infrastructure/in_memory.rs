use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::ports::{PurchaseStore, TemplateCatalog};
use crate::domain::purchase::{Purchase, PurchasePatch};
use crate::domain::template::TemplateRecord;
use crate::error::{PaymentError, Result};

/// Thread-safe in-memory purchase store.
///
/// `Clone` shares the underlying map, so clones see each other's writes;
/// that is what makes it usable as the shared store in concurrency tests.
/// The write lock makes the existence check and the insert indivisible,
/// which is the uniqueness constraint the ledger relies on.
#[derive(Default, Clone)]
pub struct InMemoryPurchaseStore {
    purchases: Arc<RwLock<HashMap<String, Purchase>>>,
}

impl InMemoryPurchaseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PurchaseStore for InMemoryPurchaseStore {
    async fn insert(&self, purchase: Purchase) -> Result<Purchase> {
        let mut purchases = self.purchases.write().await;
        if purchases.contains_key(&purchase.payment_id) {
            return Err(PaymentError::DuplicatePaymentId(purchase.payment_id));
        }
        purchases.insert(purchase.payment_id.clone(), purchase.clone());
        Ok(purchase)
    }

    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Purchase>> {
        let purchases = self.purchases.read().await;
        Ok(purchases.get(payment_id).cloned())
    }

    async fn update_by_payment_id(
        &self,
        payment_id: &str,
        patch: PurchasePatch,
    ) -> Result<Option<Purchase>> {
        let mut purchases = self.purchases.write().await;
        match purchases.get_mut(payment_id) {
            Some(purchase) => {
                purchase.apply(patch, Utc::now());
                Ok(Some(purchase.clone()))
            }
            None => Ok(None),
        }
    }

    async fn all(&self) -> Result<Vec<Purchase>> {
        let purchases = self.purchases.read().await;
        Ok(purchases.values().cloned().collect())
    }
}

/// In-memory template catalog, the price-lookup collaborator.
#[derive(Default, Clone)]
pub struct InMemoryCatalog {
    templates: Arc<RwLock<HashMap<Uuid, TemplateRecord>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<TemplateRecord>) -> Self {
        let templates = records
            .into_iter()
            .map(|record| (record.id, record))
            .collect();
        Self {
            templates: Arc::new(RwLock::new(templates)),
        }
    }

    pub async fn insert(&self, record: TemplateRecord) {
        let mut templates = self.templates.write().await;
        templates.insert(record.id, record);
    }
}

#[async_trait]
impl TemplateCatalog for InMemoryCatalog {
    async fn find(&self, template_id: Uuid) -> Result<Option<TemplateRecord>> {
        let templates = self.templates.read().await;
        Ok(templates.get(&template_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::purchase::{DEFAULT_CURRENCY, ProviderName};
    use crate::domain::status::PaymentStatus;
    use rust_decimal_macros::dec;

    fn purchase(payment_id: &str) -> Purchase {
        let now = Utc::now();
        Purchase {
            id: Uuid::new_v4(),
            template_id: Uuid::from_u128(1),
            payment_id: payment_id.to_string(),
            provider: ProviderName::new("stripe"),
            amount: dec!(9990),
            currency: DEFAULT_CURRENCY.to_string(),
            status: PaymentStatus::Pending,
            buyer_email: None,
            buyer_name: None,
            buyer_ip: None,
            provider_response: None,
            provider_raw: None,
            provider_status: None,
            provider_extra: None,
            refund: None,
            download_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemoryPurchaseStore::new();
        let row = purchase("st_1");
        store.insert(row.clone()).await.unwrap();

        let found = store.find_by_payment_id("st_1").await.unwrap().unwrap();
        assert_eq!(found, row);
        assert!(store.find_by_payment_id("st_2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_payment_id() {
        let store = InMemoryPurchaseStore::new();
        store.insert(purchase("st_1")).await.unwrap();

        let result = store.insert(purchase("st_1")).await;
        assert!(matches!(
            result,
            Err(PaymentError::DuplicatePaymentId(id)) if id == "st_1"
        ));
        assert_eq!(store.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let store = InMemoryPurchaseStore::new();
        store.insert(purchase("st_1")).await.unwrap();

        let updated = store
            .update_by_payment_id(
                "st_1",
                PurchasePatch {
                    status: Some(PaymentStatus::Approved),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, PaymentStatus::Approved);
        assert!(
            store
                .update_by_payment_id("st_missing", PurchasePatch::default())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemoryPurchaseStore::new();
        let clone = store.clone();
        store.insert(purchase("st_1")).await.unwrap();

        assert!(clone.find_by_payment_id("st_1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_catalog_lookup() {
        let record = TemplateRecord {
            id: Uuid::from_u128(7),
            name: "portfolio".to_string(),
            base_price_clp: dec!(4990),
        };
        let catalog = InMemoryCatalog::with_records(vec![record.clone()]);

        let found = catalog.find(record.id).await.unwrap().unwrap();
        assert_eq!(found, record);
        assert!(catalog.find(Uuid::from_u128(8)).await.unwrap().is_none());
    }
}
