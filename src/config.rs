use std::env;
use std::time::Duration;

/// Credentials and secrets for a single gateway.
///
/// All fields are optional: the sandbox adapters work without credentials,
/// and a missing `webhook_secret` disables signature checking for that
/// gateway (callbacks are then accepted as-is).
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    pub access_token: Option<String>,
    pub webhook_secret: Option<String>,
}

/// Explicit process configuration, constructed once at startup and passed by
/// value into the registry. Nothing in the crate reads the environment after
/// this point.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` removes the gateway from the registry entirely; its aliases
    /// then resolve to nothing.
    pub mercado_pago: Option<GatewayConfig>,
    pub stripe: Option<GatewayConfig>,
    pub paypal: Option<GatewayConfig>,
    /// Upper bound on any single gateway call.
    pub gateway_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mercado_pago: Some(GatewayConfig::default()),
            stripe: Some(GatewayConfig::default()),
            paypal: Some(GatewayConfig::default()),
            gateway_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    /// Builds the configuration from the process environment (and `.env`,
    /// when present).
    ///
    /// `PAYMENT_PROVIDERS` is a comma-separated allowlist of gateway names;
    /// when unset, all gateways are configured. Credentials come from
    /// `MP_ACCESS_TOKEN`/`MP_WEBHOOK_SECRET`, `STRIPE_API_KEY`/
    /// `STRIPE_WEBHOOK_SECRET` and `PAYPAL_CLIENT_SECRET`/
    /// `PAYPAL_WEBHOOK_SECRET`. `GATEWAY_TIMEOUT_SECS` overrides the
    /// 10-second default.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let enabled = |name: &str| match non_empty_var("PAYMENT_PROVIDERS") {
            Some(list) => list
                .split(',')
                .any(|entry| entry.trim().eq_ignore_ascii_case(name)),
            None => true,
        };

        let gateway = |token: &str, secret: &str| GatewayConfig {
            access_token: non_empty_var(token),
            webhook_secret: non_empty_var(secret),
        };

        Self {
            mercado_pago: enabled("mercadopago")
                .then(|| gateway("MP_ACCESS_TOKEN", "MP_WEBHOOK_SECRET")),
            stripe: enabled("stripe").then(|| gateway("STRIPE_API_KEY", "STRIPE_WEBHOOK_SECRET")),
            paypal: enabled("paypal")
                .then(|| gateway("PAYPAL_CLIENT_SECRET", "PAYPAL_WEBHOOK_SECRET")),
            gateway_timeout: non_empty_var("GATEWAY_TIMEOUT_SECS")
                .and_then(|raw| raw.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(10)),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
