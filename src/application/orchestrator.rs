use chrono::Utc;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use super::ledger::{NewPurchase, PurchaseLedger};
use crate::domain::intent::{PaymentIntent, RefundOptions, RefundResponse, WebhookEvent};
use crate::domain::ports::GatewayRef;
use crate::domain::purchase::{ProviderName, Purchase, PurchasePatch, RefundInfo};
use crate::domain::status::PaymentStatus;
use crate::error::{PaymentError, Result};
use crate::gateways::registry::ProviderRegistry;

const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// What intent creation hands back to the caller.
#[derive(Debug, Clone)]
pub struct IntentOutcome {
    pub purchase: Purchase,
    /// The gateway's synchronous response; `None` on the free flow.
    pub provider_response: Option<Value>,
    /// `None` tells the caller no redirect is needed and content may be
    /// released immediately.
    pub checkout_url: Option<String>,
}

/// Result of a refund request. The gateway response is always present, even
/// when the local mark failed, so the caller can reconcile manually;
/// `purchase` carries the marked row only when the ledger was updated.
#[derive(Debug, Clone)]
pub struct RefundOutcome {
    pub response: RefundResponse,
    pub purchase: Option<Purchase>,
}

/// Coordinates gateways and the ledger across the three payment protocols:
/// intent creation, webhook reconciliation and refunds.
///
/// Gateway calls are bounded by a timeout and never retried here; retry
/// policy belongs to the caller.
pub struct PaymentOrchestrator {
    registry: ProviderRegistry,
    ledger: PurchaseLedger,
    gateway_timeout: Duration,
}

impl PaymentOrchestrator {
    pub fn new(registry: ProviderRegistry, ledger: PurchaseLedger) -> Self {
        Self {
            registry,
            ledger,
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }

    pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout = timeout;
        self
    }

    pub fn ledger(&self) -> &PurchaseLedger {
        &self.ledger
    }

    /// Consumes the orchestrator and returns the final ledger state.
    pub async fn into_results(self) -> Result<Vec<Purchase>> {
        self.ledger.all().await
    }

    /// Creates a payment intent.
    ///
    /// Free flow when no provider is named or the effective amount is zero:
    /// an internal payment id is synthesized, the purchase is born
    /// `Approved`, and no gateway is contacted. Paid flow otherwise: the
    /// gateway issues the payment id and the purchase is born `Pending`,
    /// waiting for the webhook. The ledger's idempotency and price checks
    /// apply to both flows.
    pub async fn create_payment_intent(&self, intent: PaymentIntent) -> Result<IntentOutcome> {
        let Some(provider) = intent.provider.clone() else {
            return self.create_free_purchase(intent).await;
        };

        // Configuration errors fail before any catalog or gateway work.
        let gateway = self.resolve(provider.as_str())?;

        let price = self.ledger.template_price(intent.template_id).await?;
        if intent.amount.unwrap_or(price).is_zero() {
            return self.create_free_purchase(intent).await;
        }
        let response = self
            .bounded(provider.as_str(), gateway.create_payment(&intent))
            .await?;
        if response.payment_id.trim().is_empty() {
            return Err(PaymentError::Gateway {
                provider: provider.to_string(),
                message: "create payment returned an empty payment id".to_string(),
            });
        }

        let purchase = self
            .ledger
            .create_purchase(NewPurchase {
                template_id: intent.template_id,
                payment_id: response.payment_id.clone(),
                provider,
                amount: intent.amount,
                currency: intent.currency,
                buyer_email: intent.buyer_email,
                buyer_name: intent.buyer_name,
                buyer_ip: intent.buyer_ip,
                provider_response: Some(response.raw.clone()),
                status: PaymentStatus::Pending,
            })
            .await?;

        info!(
            payment_id = %purchase.payment_id,
            provider = %purchase.provider,
            "payment intent created"
        );
        Ok(IntentOutcome {
            purchase,
            provider_response: Some(response.raw),
            checkout_url: response.checkout_url,
        })
    }

    async fn create_free_purchase(&self, intent: PaymentIntent) -> Result<IntentOutcome> {
        let payment_id = format!("free_{}", Uuid::new_v4().simple());
        let purchase = self
            .ledger
            .create_purchase(NewPurchase {
                template_id: intent.template_id,
                payment_id,
                provider: ProviderName::free(),
                amount: intent.amount,
                currency: intent.currency,
                buyer_email: intent.buyer_email,
                buyer_name: intent.buyer_name,
                buyer_ip: intent.buyer_ip,
                provider_response: None,
                status: PaymentStatus::Approved,
            })
            .await?;

        info!(payment_id = %purchase.payment_id, "purchase approved without gateway");
        Ok(IntentOutcome {
            purchase,
            provider_response: None,
            checkout_url: None,
        })
    }

    /// Reconciles a gateway callback into the ledger.
    ///
    /// Unverified events and events without a payment id are rejected before
    /// any ledger mutation. Safe to invoke any number of times with the same
    /// payload: the status merge is unconditional, so re-applying the same
    /// normalized status is a no-op in effect.
    pub async fn handle_webhook(&self, provider: &str, event: WebhookEvent) -> Result<Purchase> {
        let gateway = self.resolve(provider)?;
        let parsed = gateway.parse_webhook(&event.body, &event.headers).await?;

        if !parsed.valid {
            return Err(PaymentError::InvalidWebhook(format!(
                "{provider} webhook failed verification"
            )));
        }
        let payment_id = parsed.payment_id.ok_or_else(|| {
            PaymentError::InvalidWebhook(format!("{provider} webhook carried no payment id"))
        })?;

        let status = PaymentStatus::normalize(parsed.status.as_deref());

        if let Some(current) = self.ledger.find_by_payment_id(&payment_id).await?
            && current.status.is_terminal()
            && current.status != status
        {
            // Out-of-order delivery can rewind a settled purchase; the
            // overwrite is kept (last writer wins) but is worth a trace.
            warn!(
                payment_id = %payment_id,
                from = ?current.status,
                to = ?status,
                "webhook regresses a terminal status"
            );
        }

        let patch = PurchasePatch {
            status: Some(status),
            provider_raw: Some(parsed.raw),
            provider_status: parsed.status,
            provider_extra: parsed.extra,
            refund: None,
        };
        let updated = self.ledger.update_by_payment_id(&payment_id, patch).await?;

        if updated.status == PaymentStatus::Approved {
            info!(payment_id = %updated.payment_id, "payment approved");
        }
        Ok(updated)
    }

    /// Requests a refund from the gateway and, only on a confirmed refund,
    /// marks the local purchase.
    pub async fn refund_payment(
        &self,
        provider: &str,
        payment_id: &str,
        opts: RefundOptions,
    ) -> Result<RefundOutcome> {
        let gateway = self.resolve(provider)?;
        let response = self
            .bounded(provider, gateway.refund_payment(payment_id, &opts))
            .await?;

        if !response.refunded {
            return Ok(RefundOutcome {
                response,
                purchase: None,
            });
        }

        let refund = RefundInfo {
            refund_id: response.refund_id.clone(),
            raw: Some(response.raw.clone()),
            refunded_at: Utc::now(),
        };
        match self.ledger.mark_refunded(payment_id, refund).await {
            Ok(purchase) => {
                info!(payment_id = %payment_id, "purchase refunded");
                Ok(RefundOutcome {
                    response,
                    purchase: Some(purchase),
                })
            }
            Err(err) => {
                // The gateway already moved the money; hand the response back
                // so the caller can reconcile the ledger manually.
                warn!(
                    payment_id = %payment_id,
                    error = %err,
                    "refund confirmed by gateway but local mark failed"
                );
                Ok(RefundOutcome {
                    response,
                    purchase: None,
                })
            }
        }
    }

    /// Polling fallback: asks the gateway for the current status of a
    /// payment, normalized to the canonical vocabulary.
    pub async fn payment_status(
        &self,
        provider: &str,
        payment_id: &str,
    ) -> Result<PaymentStatus> {
        let gateway = self.resolve(provider)?;
        let response = self
            .bounded(provider, gateway.get_payment_status(payment_id))
            .await?;
        Ok(PaymentStatus::normalize(Some(response.status.as_str())))
    }

    fn resolve(&self, provider: &str) -> Result<GatewayRef> {
        self.registry
            .resolve(provider)
            .ok_or_else(|| PaymentError::UnknownProvider(provider.to_string()))
    }

    async fn bounded<T, F>(&self, provider: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.gateway_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(PaymentError::GatewayTimeout {
                provider: provider.to_string(),
            }),
        }
    }
}
