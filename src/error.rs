use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("provider not configured: {0}")]
    UnknownProvider(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("supplied amount {supplied} does not match the template price {expected}")]
    AmountMismatch { expected: Decimal, supplied: Decimal },
    #[error("template not found: {0}")]
    TemplateNotFound(Uuid),
    #[error("purchase not found for payment {0}")]
    PurchaseNotFound(String),
    /// Raised by a store when an insert collides with an existing payment id.
    /// The ledger recovers from this internally; it never escapes `create_purchase`.
    #[error("a purchase already exists for payment {0}")]
    DuplicatePaymentId(String),
    #[error("invalid webhook: {0}")]
    InvalidWebhook(String),
    #[error("gateway {provider} error: {message}")]
    Gateway { provider: String, message: String },
    #[error("gateway {provider} did not respond in time")]
    GatewayTimeout { provider: String },
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
