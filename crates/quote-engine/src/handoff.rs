//! Session Handoff
//!
//! Carries exactly one quote from the pricing page to the payment page.
//! The store holds the serialized payload under a single well-known key,
//! mirroring browser sessionStorage semantics: a new quote overwrites the
//! previous one, and a successful payment clears the slot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{QuoteError, Result};
use crate::quote::Quote;

/// Well-known storage key for the live quote.
pub const HANDOFF_KEY: &str = "projectData";

/// The serialized form of a quote plus its display labels, camelCase to
/// match the payment page's expectations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffQuote {
    /// Display label, e.g. "Website Development".
    pub service: String,
    /// Catalog key, e.g. "website".
    pub service_value: String,
    pub complexity: String,
    pub complexity_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_value: Option<String>,
    // Amounts cross the wire as JSON numbers, matching what the payment
    // page reads out of the stored payload.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub deposit_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub remaining_amount: Decimal,
    pub is_hourly_rate: bool,
}

impl From<&Quote> for HandoffQuote {
    fn from(quote: &Quote) -> Self {
        Self {
            service: quote.service_label.clone(),
            service_value: quote.service.clone(),
            complexity: quote.complexity_label.clone(),
            complexity_value: quote.complexity.clone(),
            tier: quote.tier_label.clone(),
            tier_value: quote.tier.clone(),
            total_cost: quote.total_cost,
            deposit_amount: quote.deposit_amount,
            remaining_amount: quote.remaining_amount,
            is_hourly_rate: quote.is_hourly_rate,
        }
    }
}

impl HandoffQuote {
    /// Complexity with tier appended for display, e.g. "Shopify - Growth".
    pub fn complexity_display(&self) -> String {
        match &self.tier {
            Some(tier) => format!("{} - {}", self.complexity, tier),
            None => self.complexity.clone(),
        }
    }
}

/// Transient cross-page storage for the live quote.
pub trait HandoffStore: Send + Sync {
    /// Store a quote, overwriting any previous one.
    fn store(&self, quote: &HandoffQuote) -> Result<()>;

    /// Load the live quote. Missing or malformed payloads are hard
    /// precondition failures; the payment page redirects to pricing.
    fn load(&self) -> Result<HandoffQuote>;

    /// Clear the slot (after successful payment).
    fn clear(&self);
}

/// In-memory single-slot store.
#[derive(Debug, Default)]
pub struct MemoryHandoffStore {
    slot: std::sync::Mutex<Option<String>>,
}

impl MemoryHandoffStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a raw payload, bypassing serialization. Test seam for
    /// malformed data.
    pub fn store_raw(&self, payload: impl Into<String>) {
        *self.slot.lock().unwrap() = Some(payload.into());
    }
}

impl HandoffStore for MemoryHandoffStore {
    fn store(&self, quote: &HandoffQuote) -> Result<()> {
        let payload = serde_json::to_string(quote)
            .map_err(|e| QuoteError::HandoffMalformed(e.to_string()))?;
        *self.slot.lock().unwrap() = Some(payload);
        Ok(())
    }

    fn load(&self) -> Result<HandoffQuote> {
        let slot = self.slot.lock().unwrap();
        let payload = slot.as_ref().ok_or(QuoteError::HandoffMissing)?;
        serde_json::from_str(payload).map_err(|e| QuoteError::HandoffMalformed(e.to_string()))
    }

    fn clear(&self) {
        *self.slot.lock().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{derive_quote, Selection};

    #[test]
    fn round_trip_preserves_amounts() {
        let quote = derive_quote(&Selection::new("website", "basic")).unwrap();
        let handoff = HandoffQuote::from(&quote);

        let store = MemoryHandoffStore::new();
        store.store(&handoff).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, handoff);
        assert_eq!(loaded.total_cost, quote.total_cost);
        assert_eq!(loaded.deposit_amount, quote.deposit_amount);
        assert_eq!(loaded.remaining_amount, quote.remaining_amount);
    }

    #[test]
    fn amounts_serialize_as_numbers() {
        let quote = derive_quote(&Selection::new("website", "basic")).unwrap();
        let payload = serde_json::to_value(HandoffQuote::from(&quote)).unwrap();

        assert!(payload["totalCost"].is_number());
        assert_eq!(payload["totalCost"], serde_json::json!(3000.0));
        assert_eq!(payload["depositAmount"], serde_json::json!(600.0));
        assert_eq!(payload["remainingAmount"], serde_json::json!(2400.0));
    }

    #[test]
    fn new_quote_overwrites_previous() {
        let first = derive_quote(&Selection::new("website", "basic")).unwrap();
        let second =
            derive_quote(&Selection::new("website", "shopify").with_tier("growth")).unwrap();

        let store = MemoryHandoffStore::new();
        store.store(&HandoffQuote::from(&first)).unwrap();
        store.store(&HandoffQuote::from(&second)).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.complexity_value, "shopify");
        assert_eq!(loaded.complexity_display(), "Shopify - Growth");
    }

    #[test]
    fn missing_slot_is_a_precondition_failure() {
        let store = MemoryHandoffStore::new();
        assert!(matches!(store.load(), Err(QuoteError::HandoffMissing)));

        let quote = derive_quote(&Selection::new("maintenance", "standard")).unwrap();
        store.store(&HandoffQuote::from(&quote)).unwrap();
        store.clear();
        assert!(matches!(store.load(), Err(QuoteError::HandoffMissing)));
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let store = MemoryHandoffStore::new();
        store.store_raw("{not json");
        assert!(matches!(store.load(), Err(QuoteError::HandoffMalformed(_))));
    }
}
