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

const SIGNATURE_HEADER: &str = "x-signature";

/// MercadoPago sandbox adapter.
///
/// Webhooks arrive as `{"data": {"id", "status"}}`, with the id sometimes a
/// bare number; top-level `id`/`status` are accepted as a fallback for the
/// older notification format.
pub struct MercadoPagoGateway {
    config: GatewayConfig,
}

impl MercadoPagoGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoGateway {
    fn name(&self) -> &str {
        "mercadopago"
    }

    async fn create_payment(&self, intent: &PaymentIntent) -> Result<CreatePaymentResponse> {
        let payment_id = format!("mp_{}", Uuid::new_v4().simple());
        let checkout_url = format!("https://sandbox.mercadopago.cl/checkout/{payment_id}");
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

        let payment_id = id_string(body.pointer("/data/id"))
            .or_else(|| id_string(body.get("id")))
            .or_else(|| id_string(body.get("paymentId")));
        let status =
            status_string(body.pointer("/data/status")).or_else(|| status_string(body.get("status")));

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
            refund_id: Some(format!("mp_ref_{}", Uuid::new_v4().simple())),
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

    fn gateway_with_secret(secret: Option<&str>) -> MercadoPagoGateway {
        MercadoPagoGateway::new(GatewayConfig {
            access_token: None,
            webhook_secret: secret.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_parse_webhook_data_layout() {
        let gateway = gateway_with_secret(None);
        let body = json!({"data": {"id": "mp_abc", "status": "approved"}});

        let parsed = gateway.parse_webhook(&body, &HashMap::new()).await.unwrap();
        assert!(parsed.valid);
        assert_eq!(parsed.payment_id.as_deref(), Some("mp_abc"));
        assert_eq!(parsed.status.as_deref(), Some("approved"));
        assert_eq!(parsed.raw, body);
    }

    #[tokio::test]
    async fn test_parse_webhook_numeric_id_fallback() {
        let gateway = gateway_with_secret(None);
        let body = json!({"id": 118846290, "status": "in_process"});

        let parsed = gateway.parse_webhook(&body, &HashMap::new()).await.unwrap();
        assert_eq!(parsed.payment_id.as_deref(), Some("118846290"));
        assert_eq!(parsed.status.as_deref(), Some("in_process"));
    }

    #[tokio::test]
    async fn test_parse_webhook_rejects_bad_signature() {
        let gateway = gateway_with_secret(Some("topsecret"));
        let body = json!({"data": {"id": "mp_abc", "status": "approved"}});
        let headers = HashMap::from([("x-signature".to_string(), "wrong".to_string())]);

        let parsed = gateway.parse_webhook(&body, &headers).await.unwrap();
        assert!(!parsed.valid);
        assert!(parsed.payment_id.is_none());
    }

    #[tokio::test]
    async fn test_create_payment_returns_prefixed_id() {
        let gateway = gateway_with_secret(None);
        let intent = PaymentIntent {
            template_id: Uuid::new_v4(),
            provider: None,
            buyer_email: None,
            buyer_name: None,
            buyer_ip: None,
            amount: None,
            currency: None,
            metadata: None,
        };

        let response = gateway.create_payment(&intent).await.unwrap();
        assert!(response.payment_id.starts_with("mp_"));
        assert!(
            response
                .checkout_url
                .unwrap()
                .contains(&response.payment_id)
        );
    }
}
