//! Error Types for Quote Engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, QuoteError>;

#[derive(Error, Debug)]
pub enum QuoteError {
    /// No catalog entry matches the selection; no quote may be displayed.
    #[error("Unknown selection: service={service}, complexity={complexity}, tier={tier:?}")]
    UnknownSelection {
        service: String,
        complexity: String,
        tier: Option<String>,
    },

    /// The selected complexity is tiered and no tier was chosen.
    #[error("Tier selection required for {complexity}")]
    TierRequired { complexity: String },

    /// Nothing stored under the handoff key; the payment page must
    /// redirect back to pricing.
    #[error("No quote in handoff store")]
    HandoffMissing,

    /// Stored handoff payload did not deserialize; treated the same as
    /// missing by the payment page.
    #[error("Malformed handoff payload: {0}")]
    HandoffMalformed(String),
}
