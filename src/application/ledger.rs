use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::{CatalogBox, PurchaseStoreBox};
use crate::domain::purchase::{
    DEFAULT_CURRENCY, ProviderName, Purchase, PurchasePatch, RefundInfo,
};
use crate::domain::status::PaymentStatus;
use crate::error::{PaymentError, Result};

/// Input for a ledger insert, assembled by the orchestrator once a payment
/// id exists (gateway-issued or synthesized for the free flow).
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub template_id: Uuid,
    pub payment_id: String,
    pub provider: ProviderName,
    /// Caller-supplied amount; checked against the catalog price.
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub buyer_email: Option<String>,
    pub buyer_name: Option<String>,
    pub buyer_ip: Option<String>,
    pub provider_response: Option<Value>,
    /// `Pending` for the paid flow, `Approved` for the free flow.
    pub status: PaymentStatus,
}

/// The authoritative local record of purchases.
///
/// Owns the store and the catalog lookup; everything that writes a purchase
/// row goes through here. Creation is idempotent per payment id and safe
/// under concurrent duplicates: the store's uniqueness constraint is the
/// single serialization point, there is no in-process lock.
pub struct PurchaseLedger {
    store: PurchaseStoreBox,
    catalog: CatalogBox,
}

impl PurchaseLedger {
    pub fn new(store: PurchaseStoreBox, catalog: CatalogBox) -> Self {
        Self { store, catalog }
    }

    /// Price of a catalog item, failing when the item does not exist.
    pub async fn template_price(&self, template_id: Uuid) -> Result<Decimal> {
        let template = self
            .catalog
            .find(template_id)
            .await?
            .ok_or(PaymentError::TemplateNotFound(template_id))?;
        Ok(template.base_price_clp)
    }

    /// Idempotent create keyed by `payment_id`.
    ///
    /// An existing row is returned unchanged. Otherwise the catalog price is
    /// resolved (a supplied amount must match it exactly), the row is
    /// inserted under the uniqueness constraint, and a lost race is recovered
    /// by re-reading the winner's row. Both sides of a race therefore observe
    /// the same purchase.
    pub async fn create_purchase(&self, data: NewPurchase) -> Result<Purchase> {
        if let Some(existing) = self.store.find_by_payment_id(&data.payment_id).await? {
            return Ok(existing);
        }

        let price = self.template_price(data.template_id).await?;
        let amount = match data.amount {
            Some(supplied) if supplied != price => {
                return Err(PaymentError::AmountMismatch {
                    expected: price,
                    supplied,
                });
            }
            Some(supplied) => supplied,
            None => price,
        };

        let now = Utc::now();
        let purchase = Purchase {
            id: Uuid::new_v4(),
            template_id: data.template_id,
            payment_id: data.payment_id.clone(),
            provider: data.provider,
            amount,
            currency: data
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            status: data.status,
            buyer_email: data.buyer_email,
            buyer_name: data.buyer_name,
            buyer_ip: data.buyer_ip,
            provider_response: data.provider_response,
            provider_raw: None,
            provider_status: None,
            provider_extra: None,
            refund: None,
            download_count: 0,
            created_at: now,
            updated_at: now,
        };

        match self.store.insert(purchase).await {
            Ok(created) => Ok(created),
            // Lost the insert race; the winner's row is the record.
            Err(PaymentError::DuplicatePaymentId(payment_id)) => self
                .store
                .find_by_payment_id(&payment_id)
                .await?
                .ok_or(PaymentError::PurchaseNotFound(payment_id)),
            Err(err) => Err(err),
        }
    }

    /// Unconditional merge keyed by payment id; last writer wins.
    pub async fn update_by_payment_id(
        &self,
        payment_id: &str,
        patch: PurchasePatch,
    ) -> Result<Purchase> {
        self.store
            .update_by_payment_id(payment_id, patch)
            .await?
            .ok_or_else(|| PaymentError::PurchaseNotFound(payment_id.to_string()))
    }

    /// Sets the row to `Refunded` and records the gateway's refund metadata.
    pub async fn mark_refunded(&self, payment_id: &str, refund: RefundInfo) -> Result<Purchase> {
        let patch = PurchasePatch {
            status: Some(PaymentStatus::Refunded),
            refund: Some(refund),
            ..Default::default()
        };
        self.update_by_payment_id(payment_id, patch).await
    }

    pub async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Purchase>> {
        self.store.find_by_payment_id(payment_id).await
    }

    pub async fn all(&self) -> Result<Vec<Purchase>> {
        self.store.all().await
    }
}
