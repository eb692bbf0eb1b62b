use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::io::BufRead;

use crate::domain::intent::{PaymentIntent, RefundOptions};
use crate::error::Result;

/// One line of the event stream: an intent, a gateway callback, or a refund
/// request, discriminated by the `op` field.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Event {
    Intent(PaymentIntent),
    Webhook {
        provider: String,
        #[serde(default)]
        body: Value,
        #[serde(default)]
        headers: HashMap<String, String>,
    },
    Refund {
        provider: String,
        payment_id: String,
        #[serde(flatten)]
        opts: RefundOptions,
    },
}

/// Reads payment events from a JSON-lines source.
///
/// Wraps any `BufRead` and yields `Result<Event>` lazily, so large replay
/// files stream without being loaded into memory. Blank lines are skipped;
/// a malformed line surfaces as an error for that line only.
pub struct EventReader<R: BufRead> {
    source: R,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn events(self) -> impl Iterator<Item = Result<Event>> {
        self.source
            .lines()
            .filter(|line| {
                line.as_ref()
                    .map(|content| !content.trim().is_empty())
                    .unwrap_or(true)
            })
            .map(|line| {
                let line = line?;
                serde_json::from_str(&line).map_err(Into::into)
            })
    }
}
