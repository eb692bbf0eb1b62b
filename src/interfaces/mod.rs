//! Transport-facing adapters for the CLI: reading payment events and
//! writing ledger rows as JSON lines.

pub mod jsonl;
