use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use uuid::Uuid;

use super::{id_string, signature_ok, status_string};
use crate::config::GatewayConfig;
use crate::domain::intent::{
    CreatePaymentResponse, ParsedWebhook, PaymentIntent, PaymentStatusResponse, RefundOptions,
    RefundResponse,
};
use crate::domain::ports::PaymentGateway;
use crate::error::Result;

const SIGNATURE_HEADER: &str = "stripe-signature";

/// Stripe sandbox adapter. Events nest the object under
/// `data.object`; top-level `id`/`status` are a fallback.
pub struct StripeGateway {
    config: GatewayConfig,
}

impl StripeGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn name(&self) -> &str {
        "stripe"
    }

    async fn create_payment(&self, intent: &PaymentIntent) -> Result<CreatePaymentResponse> {
        let payment_id = format!("st_{}", Uuid::new_v4().simple());
        let checkout_url = format!("https://checkout.stripe.dev/session/{payment_id}");
        Ok(CreatePaymentResponse {
            payment_id: payment_id.clone(),
            checkout_url: Some(checkout_url),
            raw: json!({
                "id": payment_id,
                "object": "checkout.session",
                "template_id": intent.template_id,
                "amount": intent.amount,
                "currency": intent.currency,
                "metadata": intent.metadata,
            }),
        })
    }

    async fn parse_webhook(
        &self,
        body: &Value,
        headers: &HashMap<String, String>,
    ) -> Result<ParsedWebhook> {
        if !signature_ok(
            self.config.webhook_secret.as_deref(),
            headers,
            SIGNATURE_HEADER,
        ) {
            return Ok(ParsedWebhook {
                valid: false,
                payment_id: None,
                status: None,
                raw: body.clone(),
                extra: None,
            });
        }

        let payment_id = id_string(body.pointer("/data/object/id"))
            .or_else(|| id_string(body.get("id")))
            .or_else(|| id_string(body.get("paymentId")));
        let status = status_string(body.pointer("/data/object/status"))
            .or_else(|| status_string(body.get("status")));

        Ok(ParsedWebhook {
            valid: true,
            payment_id,
            status,
            raw: body.clone(),
            extra: Some(json!({ "headers": headers })),
        })
    }

    async fn refund_payment(
        &self,
        payment_id: &str,
        opts: &RefundOptions,
    ) -> Result<RefundResponse> {
        Ok(RefundResponse {
            refunded: true,
            refund_id: Some(format!("st_ref_{}", Uuid::new_v4().simple())),
            raw: json!({
                "payment_id": payment_id,
                "amount": opts.amount,
                "reason": opts.reason,
                "idempotency_key": opts.idempotency_key,
            }),
        })
    }

    async fn get_payment_status(&self, payment_id: &str) -> Result<PaymentStatusResponse> {
        Ok(PaymentStatusResponse {
            payment_id: payment_id.to_string(),
            status: "approved".to_string(),
        })
    }
}
