//! Gateway adapters and their registry.
//!
//! Each adapter runs against the provider's sandbox: it synthesizes prefixed
//! payment ids and checkout URLs on create, and parses callbacks using the
//! provider's real wire layout. Swapping one for a live SDK integration only
//! touches that adapter's file.

pub mod mercado_pago;
pub mod paypal;
pub mod registry;
pub mod stripe;

use serde_json::Value;
use std::collections::HashMap;

/// Case-insensitive header lookup; transports disagree on header casing.
pub(crate) fn header_value<'a>(
    headers: &'a HashMap<String, String>,
    name: &str,
) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Shared-secret signature check. With no secret configured the event is
/// accepted, which is the sandbox behavior; with one configured the header
/// must match exactly.
pub(crate) fn signature_ok(
    secret: Option<&str>,
    headers: &HashMap<String, String>,
    header_name: &str,
) -> bool {
    match secret {
        None => true,
        Some(secret) => header_value(headers, header_name).is_some_and(|sig| sig == secret),
    }
}

/// Extracts an id-like value that providers send either as a string or as a
/// bare number.
pub(crate) fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extracts a status string, ignoring non-string values.
pub(crate) fn status_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}
