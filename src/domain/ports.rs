use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::intent::{
    CreatePaymentResponse, ParsedWebhook, PaymentIntent, PaymentStatusResponse, RefundOptions,
    RefundResponse,
};
use super::purchase::{Purchase, PurchasePatch};
use super::template::TemplateRecord;
use crate::error::Result;

/// The uniform gateway capability. One implementation per provider; each one
/// absorbs its gateway's wire format so the orchestrator never branches on
/// provider identity.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Canonical provider name, for diagnostics and log context.
    fn name(&self) -> &str;

    /// Initiates a charge. Must return a non-empty payment id on success;
    /// any failure is an error, never a partial result.
    async fn create_payment(&self, intent: &PaymentIntent) -> Result<CreatePaymentResponse>;

    /// Validates a callback and extracts a normalized event from it.
    async fn parse_webhook(
        &self,
        body: &Value,
        headers: &HashMap<String, String>,
    ) -> Result<ParsedWebhook>;

    /// Requests cancellation of funds for a payment.
    async fn refund_payment(
        &self,
        payment_id: &str,
        opts: &RefundOptions,
    ) -> Result<RefundResponse>;

    /// Polling fallback for when no webhook arrives.
    async fn get_payment_status(&self, payment_id: &str) -> Result<PaymentStatusResponse>;
}

pub type GatewayRef = Arc<dyn PaymentGateway>;

/// Persistence boundary for the purchase ledger.
///
/// `insert` enforces the uniqueness constraint on `payment_id` atomically and
/// signals a collision with `PaymentError::DuplicatePaymentId`. That
/// constraint is the only serialization point for concurrent creators, so an
/// implementation must make the existence check and the write indivisible.
#[async_trait]
pub trait PurchaseStore: Send + Sync {
    async fn insert(&self, purchase: Purchase) -> Result<Purchase>;

    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Purchase>>;

    /// Atomic read-merge-write keyed by payment id. Returns `None` when no
    /// row matches.
    async fn update_by_payment_id(
        &self,
        payment_id: &str,
        patch: PurchasePatch,
    ) -> Result<Option<Purchase>>;

    async fn all(&self) -> Result<Vec<Purchase>>;
}

pub type PurchaseStoreBox = Box<dyn PurchaseStore>;

/// Price lookup against the catalog, the ledger's only external read.
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    async fn find(&self, template_id: Uuid) -> Result<Option<TemplateRecord>>;
}

pub type CatalogBox = Box<dyn TemplateCatalog>;
