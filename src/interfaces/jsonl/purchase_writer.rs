use std::io::Write;

use crate::domain::purchase::Purchase;
use crate::error::Result;

/// Writes ledger rows as JSON lines, one purchase per line.
pub struct PurchaseWriter<W: Write> {
    sink: W,
}

impl<W: Write> PurchaseWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn write_purchases(&mut self, purchases: Vec<Purchase>) -> Result<()> {
        for purchase in purchases {
            let line = serde_json::to_string(&purchase)?;
            writeln!(self.sink, "{line}")?;
        }
        self.sink.flush()?;
        Ok(())
    }
}
