use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use super::status::PaymentStatus;

/// Currency recorded when the intent does not name one.
pub const DEFAULT_CURRENCY: &str = "CLP";

/// A lowercase-normalized gateway name.
///
/// The set of valid names is open and configuration-driven; the registry is
/// the authority on which names are actually backed by a gateway. Purchases
/// settled without a gateway round trip carry the [`ProviderName::FREE`]
/// sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ProviderName(String);

impl ProviderName {
    /// Sentinel recorded when no gateway participated in the purchase.
    pub const FREE: &'static str = "free";

    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    pub fn free() -> Self {
        Self(Self::FREE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_free(&self) -> bool {
        self.0 == Self::FREE
    }
}

impl From<String> for ProviderName {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<ProviderName> for String {
    fn from(name: ProviderName) -> Self {
        name.0
    }
}

impl From<&str> for ProviderName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata recorded when a gateway confirms a refund.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct RefundInfo {
    pub refund_id: Option<String>,
    pub raw: Option<Value>,
    pub refunded_at: DateTime<Utc>,
}

/// The ledger's unit of record: one row per external payment id, for the
/// lifetime of the system. Rows are never deleted.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Purchase {
    /// Ledger-assigned identity.
    pub id: Uuid,
    /// The catalog item that was bought.
    pub template_id: Uuid,
    /// External gateway payment id; unique, and the idempotency key for the
    /// whole subsystem.
    pub payment_id: String,
    pub provider: ProviderName,
    /// Charged amount; immutable once set and equal to the catalog price at
    /// creation time.
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    // Buyer attributes are audit data only, never used for authorization.
    pub buyer_email: Option<String>,
    pub buyer_name: Option<String>,
    pub buyer_ip: Option<String>,
    /// Synchronous create-payment response, kept for dispute resolution.
    pub provider_response: Option<Value>,
    /// Last webhook payload, verbatim.
    pub provider_raw: Option<Value>,
    /// Provider-native status string before normalization.
    pub provider_status: Option<String>,
    pub provider_extra: Option<Value>,
    pub refund: Option<RefundInfo>,
    pub download_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field merge applied by `update_by_payment_id`. `None` leaves the
/// corresponding field untouched; set fields overwrite unconditionally.
#[derive(Debug, Clone, Default)]
pub struct PurchasePatch {
    pub status: Option<PaymentStatus>,
    pub provider_raw: Option<Value>,
    pub provider_status: Option<String>,
    pub provider_extra: Option<Value>,
    pub refund: Option<RefundInfo>,
}

impl Purchase {
    /// Merges a patch into the row and bumps `updated_at`.
    pub fn apply(&mut self, patch: PurchasePatch, now: DateTime<Utc>) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(raw) = patch.provider_raw {
            self.provider_raw = Some(raw);
        }
        if let Some(status) = patch.provider_status {
            self.provider_status = Some(status);
        }
        if let Some(extra) = patch.provider_extra {
            self.provider_extra = Some(extra);
        }
        if let Some(refund) = patch.refund {
            self.refund = Some(refund);
        }
        self.updated_at = now;
    }
}
