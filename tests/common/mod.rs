#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use storefront_payments::application::ledger::PurchaseLedger;
use storefront_payments::application::orchestrator::PaymentOrchestrator;
use storefront_payments::config::AppConfig;
use storefront_payments::domain::intent::{
    CreatePaymentResponse, ParsedWebhook, PaymentIntent, PaymentStatusResponse, RefundOptions,
    RefundResponse,
};
use storefront_payments::domain::ports::PaymentGateway;
use storefront_payments::domain::purchase::ProviderName;
use storefront_payments::domain::template::TemplateRecord;
use storefront_payments::error::Result;
use storefront_payments::gateways::registry::ProviderRegistry;
use storefront_payments::infrastructure::in_memory::{InMemoryCatalog, InMemoryPurchaseStore};

pub fn priced_template_id() -> Uuid {
    Uuid::from_u128(1)
}

pub fn free_template_id() -> Uuid {
    Uuid::from_u128(2)
}

pub fn seeded_catalog() -> InMemoryCatalog {
    InMemoryCatalog::with_records(vec![
        TemplateRecord {
            id: priced_template_id(),
            name: "landing".to_string(),
            base_price_clp: dec!(14990),
        },
        TemplateRecord {
            id: free_template_id(),
            name: "starter".to_string(),
            base_price_clp: dec!(0),
        },
    ])
}

/// Orchestrator wired with the sandbox gateways and a shared in-memory
/// store; the returned store clone observes everything the engine writes.
pub fn sandbox_orchestrator() -> (PaymentOrchestrator, InMemoryPurchaseStore) {
    let store = InMemoryPurchaseStore::new();
    let ledger = PurchaseLedger::new(Box::new(store.clone()), Box::new(seeded_catalog()));
    let registry = ProviderRegistry::from_config(&AppConfig::default());
    (PaymentOrchestrator::new(registry, ledger), store)
}

pub fn intent(template_id: Uuid, provider: Option<&str>) -> PaymentIntent {
    PaymentIntent {
        template_id,
        provider: provider.map(ProviderName::new),
        buyer_email: Some("buyer@example.com".to_string()),
        buyer_name: Some("Buyer".to_string()),
        buyer_ip: None,
        amount: None,
        currency: None,
        metadata: None,
    }
}

/// Scripted gateway for asserting on orchestrator behavior: counts calls,
/// returns a fixed payment id, and refunds only when told to.
pub struct ScriptedGateway {
    pub payment_id: String,
    pub refunds: bool,
    pub create_calls: AtomicUsize,
    pub refund_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new(payment_id: &str, refunds: bool) -> Arc<Self> {
        Arc::new(Self {
            payment_id: payment_id.to_string(),
            refunds,
            create_calls: AtomicUsize::new(0),
            refund_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn create_payment(&self, _intent: &PaymentIntent) -> Result<CreatePaymentResponse> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CreatePaymentResponse {
            payment_id: self.payment_id.clone(),
            checkout_url: Some(format!("https://gateway.test/checkout/{}", self.payment_id)),
            raw: json!({"id": self.payment_id}),
        })
    }

    async fn parse_webhook(
        &self,
        body: &Value,
        _headers: &HashMap<String, String>,
    ) -> Result<ParsedWebhook> {
        Ok(ParsedWebhook {
            valid: body.get("valid").and_then(Value::as_bool).unwrap_or(true),
            payment_id: body
                .get("payment_id")
                .and_then(Value::as_str)
                .map(str::to_string),
            status: body
                .get("status")
                .and_then(Value::as_str)
                .map(str::to_string),
            raw: body.clone(),
            extra: None,
        })
    }

    async fn refund_payment(
        &self,
        payment_id: &str,
        _opts: &RefundOptions,
    ) -> Result<RefundResponse> {
        self.refund_calls.fetch_add(1, Ordering::SeqCst);
        Ok(RefundResponse {
            refunded: self.refunds,
            refund_id: self.refunds.then(|| format!("ref_{payment_id}")),
            raw: json!({"payment_id": payment_id, "refunded": self.refunds}),
        })
    }

    async fn get_payment_status(&self, payment_id: &str) -> Result<PaymentStatusResponse> {
        Ok(PaymentStatusResponse {
            payment_id: payment_id.to_string(),
            status: "approved".to_string(),
        })
    }
}

/// Orchestrator whose only provider is a scripted gateway registered under
/// the given alias.
pub fn scripted_orchestrator(
    alias: &str,
    gateway: Arc<ScriptedGateway>,
) -> (PaymentOrchestrator, InMemoryPurchaseStore) {
    let store = InMemoryPurchaseStore::new();
    let ledger = PurchaseLedger::new(Box::new(store.clone()), Box::new(seeded_catalog()));
    let mut registry = ProviderRegistry::new();
    registry.register(gateway, &[alias]);
    (PaymentOrchestrator::new(registry, ledger), store)
}
