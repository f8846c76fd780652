//! Quote Derivation
//!
//! Turns a catalog selection into an immutable price breakdown: total,
//! deposit due up front, and remainder due on completion.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogEntry, Price};
use crate::error::{QuoteError, Result};

/// Fraction of a fixed price collected as the deposit.
const DEPOSIT_RATE: Decimal = dec!(0.2);

/// A pricing-form selection, by catalog key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub service: String,
    pub complexity: String,
    #[serde(default)]
    pub tier: Option<String>,
}

impl Selection {
    pub fn new(service: impl Into<String>, complexity: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            complexity: complexity.into(),
            tier: None,
        }
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }
}

/// An immutable price breakdown for one selection.
///
/// Invariants:
/// - fixed price P: `deposit_amount == round(0.2 * P)` and
///   `deposit_amount + remaining_amount == P`
/// - hourly rate P: `deposit_amount == P`, `remaining_amount == 0`,
///   further hours billed incrementally
/// - contact pricing: all amounts zero; never payment-collectible
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub service: String,
    pub complexity: String,
    pub tier: Option<String>,
    pub service_label: String,
    pub complexity_label: String,
    pub tier_label: Option<String>,
    pub description: String,
    pub total_cost: Decimal,
    pub deposit_amount: Decimal,
    pub remaining_amount: Decimal,
    pub is_hourly_rate: bool,
    pub is_contact: bool,
}

impl Quote {
    /// False exactly for contact-priced selections: there is nothing to
    /// charge, so the payment flow must hand off to the contact flow.
    pub fn payment_collectible(&self) -> bool {
        !self.is_contact
    }

    /// Deposit in integer cents, as the payment gateway expects.
    pub fn deposit_cents(&self) -> i64 {
        (self.deposit_amount * dec!(100)).to_i64().unwrap_or(0)
    }
}

/// Derive a quote for a selection against the standard catalog.
pub fn derive_quote(selection: &Selection) -> Result<Quote> {
    derive_quote_from(Catalog::standard(), selection)
}

/// Derive a quote against an explicit catalog.
pub fn derive_quote_from(catalog: &Catalog, selection: &Selection) -> Result<Quote> {
    let service = catalog
        .service(&selection.service)
        .ok_or_else(|| unknown(selection))?;
    let entry = service
        .complexities
        .get(selection.complexity.as_str())
        .ok_or_else(|| unknown(selection))?;

    // A tiered complexity has no price of its own; the quote always comes
    // from the tier's entry. A stale tier on a non-tiered complexity is
    // ignored rather than rejected.
    let (priced, tier, tier_label) = match &entry.tiers {
        Some(tiers) => {
            let tier_key = selection.tier.as_deref().ok_or_else(|| {
                QuoteError::TierRequired {
                    complexity: selection.complexity.clone(),
                }
            })?;
            let tier_entry = tiers.get(tier_key).ok_or_else(|| unknown(selection))?;
            (
                tier_entry,
                Some(tier_key.to_string()),
                Some(tier_entry.label.to_string()),
            )
        }
        None => (entry, None, None),
    };

    let quote = build_quote(selection, service.label, entry, priced, tier, tier_label);
    tracing::debug!(
        service = %quote.service,
        complexity = %quote.complexity,
        tier = ?quote.tier,
        deposit = %quote.deposit_amount,
        "Derived quote"
    );
    Ok(quote)
}

fn build_quote(
    selection: &Selection,
    service_label: &str,
    entry: &CatalogEntry,
    priced: &CatalogEntry,
    tier: Option<String>,
    tier_label: Option<String>,
) -> Quote {
    let (total, deposit, remaining, is_hourly, is_contact) = match &priced.price {
        Price::Fixed(price) => {
            let deposit = (price * DEPOSIT_RATE)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
            (*price, deposit, price - deposit, false, false)
        }
        // One hour up front; nothing arithmetic remains.
        Price::Hourly(rate) => (*rate, *rate, Decimal::ZERO, true, false),
        // Zero sentinel, not an error: the caller routes to the contact flow.
        Price::Contact => (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, false, true),
    };

    Quote {
        service: selection.service.clone(),
        complexity: selection.complexity.clone(),
        tier,
        service_label: service_label.to_string(),
        complexity_label: entry.label.to_string(),
        tier_label,
        description: priced.description.to_string(),
        total_cost: total,
        deposit_amount: deposit,
        remaining_amount: remaining,
        is_hourly_rate: is_hourly,
        is_contact,
    }
}

fn unknown(selection: &Selection) -> QuoteError {
    QuoteError::UnknownSelection {
        service: selection.service.clone(),
        complexity: selection.complexity.clone(),
        tier: selection.tier.clone(),
    }
}
