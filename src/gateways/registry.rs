use std::collections::HashMap;
use std::sync::Arc;

use super::mercado_pago::MercadoPagoGateway;
use super::paypal::PaypalGateway;
use super::stripe::StripeGateway;
use crate::config::AppConfig;
use crate::domain::ports::GatewayRef;

/// Resolves a provider name to its gateway adapter.
///
/// Built once from an explicit [`AppConfig`]; the set of gateways is closed
/// after construction. Lookup is case-insensitive and unknown names resolve
/// to `None`; the caller decides how to surface that.
#[derive(Default)]
pub struct ProviderRegistry {
    gateways: HashMap<String, GatewayRef>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wires up every gateway the configuration enables, under the same
    /// aliases the dashboard and webhook routes use.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut registry = Self::new();
        if let Some(gateway) = &config.mercado_pago {
            registry.register(
                Arc::new(MercadoPagoGateway::new(gateway.clone())),
                &["mercadopago", "mp"],
            );
        }
        if let Some(gateway) = &config.stripe {
            registry.register(
                Arc::new(StripeGateway::new(gateway.clone())),
                &["stripe", "st"],
            );
        }
        if let Some(gateway) = &config.paypal {
            registry.register(
                Arc::new(PaypalGateway::new(gateway.clone())),
                &["paypal", "pp"],
            );
        }
        registry
    }

    pub fn register(&mut self, gateway: GatewayRef, aliases: &[&str]) {
        for alias in aliases {
            self.gateways
                .insert(alias.trim().to_lowercase(), gateway.clone());
        }
    }

    pub fn resolve(&self, name: &str) -> Option<GatewayRef> {
        self.gateways.get(&name.trim().to_lowercase()).cloned()
    }
}
