use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use super::purchase::ProviderName;

/// A validated request to begin collecting payment for a catalog item.
///
/// Field validation happens upstream; by the time an intent reaches the
/// orchestrator it is structurally sound, but its `amount` is still untrusted
/// and is checked against the catalog price by the ledger.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaymentIntent {
    pub template_id: Uuid,
    /// Gateway to charge through. Absent means the free flow.
    #[serde(default)]
    pub provider: Option<ProviderName>,
    #[serde(default)]
    pub buyer_email: Option<String>,
    #[serde(default)]
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub buyer_ip: Option<String>,
    /// Client-supplied amount. Must match the catalog price exactly when
    /// present; the server computes it when omitted.
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Opaque payload forwarded to the gateway.
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// A raw gateway callback: body and headers, untouched by the transport.
#[derive(Debug, Clone, Default)]
pub struct WebhookEvent {
    pub body: Value,
    pub headers: HashMap<String, String>,
}

/// Caller options for a refund request.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RefundOptions {
    /// Partial refund amount; the full charge when omitted.
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub reason: Option<String>,
    /// Forwarded to the gateway so repeated attempts can be collapsed on
    /// their side. The core itself does not deduplicate refunds.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// Result of `PaymentGateway::create_payment`. A gateway that cannot produce
/// a payment id must fail instead of returning this.
#[derive(Debug, Clone)]
pub struct CreatePaymentResponse {
    pub payment_id: String,
    /// Redirect target for the buyer; `None` when the gateway needs none.
    pub checkout_url: Option<String>,
    pub raw: Value,
}

/// A gateway callback after validation and extraction.
///
/// `valid: false` or a missing `payment_id` makes the event unusable; the
/// orchestrator rejects it without touching the ledger.
#[derive(Debug, Clone)]
pub struct ParsedWebhook {
    pub valid: bool,
    pub payment_id: Option<String>,
    /// Provider-native status string, not yet normalized.
    pub status: Option<String>,
    pub raw: Value,
    pub extra: Option<Value>,
}

/// Result of `PaymentGateway::refund_payment`. `refunded` is the sole signal
/// the orchestrator trusts before marking local state.
#[derive(Debug, Clone)]
pub struct RefundResponse {
    pub refunded: bool,
    pub refund_id: Option<String>,
    pub raw: Value,
}

/// Result of the polling fallback `PaymentGateway::get_payment_status`.
#[derive(Debug, Clone)]
pub struct PaymentStatusResponse {
    pub payment_id: String,
    pub status: String,
}
