//! Application layer: the purchase ledger and the payment orchestrator that
//! drives intent creation, webhook reconciliation and refunds against the
//! domain ports.

pub mod ledger;
pub mod orchestrator;
