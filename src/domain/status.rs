use serde::{Deserialize, Serialize};

/// Canonical payment status, the crate's own four-value vocabulary.
///
/// Every gateway reports its own status strings; [`PaymentStatus::normalize`]
/// is the single place where those are folded into this enum.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Refunded,
}

impl PaymentStatus {
    /// Maps a provider-reported status to the canonical vocabulary.
    ///
    /// Total over its input: an unrecognized or absent status resolves to
    /// `Pending`, never to a terminal state and never to an error.
    pub fn normalize(provider_status: Option<&str>) -> Self {
        let Some(raw) = provider_status else {
            return Self::Pending;
        };
        match raw.trim().to_lowercase().as_str() {
            "approved" | "paid" | "completed" | "success" => Self::Approved,
            "pending" | "in_process" | "pending_payment" => Self::Pending,
            "rejected" | "cancelled" | "failed" => Self::Rejected,
            "refunded" | "returned" => Self::Refunded,
            _ => Self::Pending,
        }
    }

    /// `Rejected` and `Refunded` admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Refunded)
    }
}
