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

const SIGNATURE_HEADER: &str = "paypal-transmission-sig";

/// PayPal sandbox adapter. Webhook events carry the payment under
/// `resource`; top-level `id`/`status` are a fallback.
pub struct PaypalGateway {
    config: GatewayConfig,
}

impl PaypalGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PaymentGateway for PaypalGateway {
    fn name(&self) -> &str {
        "paypal"
    }

    async fn create_payment(&self, intent: &PaymentIntent) -> Result<CreatePaymentResponse> {
        let payment_id = format!("pp_{}", Uuid::new_v4().simple());
        let checkout_url = format!("https://sandbox.paypal.com/checkoutnow/{payment_id}");
        Ok(CreatePaymentResponse {
            payment_id: payment_id.clone(),
            checkout_url: Some(checkout_url),
            raw: json!({
                "id": payment_id,
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

        let payment_id = id_string(body.pointer("/resource/id"))
            .or_else(|| id_string(body.get("id")))
            .or_else(|| id_string(body.get("paymentId")));
        let status = status_string(body.pointer("/resource/status"))
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
            refund_id: Some(format!("pp_ref_{}", Uuid::new_v4().simple())),
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_parse_webhook_resource_layout() {
        let gateway = PaypalGateway::new(GatewayConfig::default());
        let body = json!({
            "event_type": "PAYMENT.CAPTURE.COMPLETED",
            "resource": {"id": "pp_9", "status": "COMPLETED"}
        });

        let parsed = gateway.parse_webhook(&body, &HashMap::new()).await.unwrap();
        assert!(parsed.valid);
        assert_eq!(parsed.payment_id.as_deref(), Some("pp_9"));
        assert_eq!(parsed.status.as_deref(), Some("COMPLETED"));
    }

    #[tokio::test]
    async fn test_refund_carries_options_through() {
        let gateway = PaypalGateway::new(GatewayConfig::default());
        let opts = RefundOptions {
            amount: None,
            reason: Some("buyer request".to_string()),
            idempotency_key: Some("refund-attempt-1".to_string()),
        };

        let response = gateway.refund_payment("pp_9", &opts).await.unwrap();
        assert!(response.refunded);
        assert_eq!(response.raw["reason"], "buyer request");
        assert_eq!(response.raw["idempotency_key"], "refund-attempt-1");
    }
}
