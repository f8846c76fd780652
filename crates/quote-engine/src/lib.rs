//! # quote-engine
//!
//! Deposit pricing for project work: a static service catalog, quote
//! derivation with a 20% deposit split, and the page-to-page handoff that
//! carries a quote from the pricing step to the payment step.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────┐    ┌────────────┐    ┌─────────────┐    ┌──────────────┐
//! │ Catalog  │───▶│ derive_quote│───▶│ HandoffStore│───▶│ Payment page │
//! │ (static) │    │  -> Quote   │    │ (one slot)  │    │ (deposit due)│
//! └──────────┘    └────────────┘    └─────────────┘    └──────────────┘
//! ```
//!
//! ## Deposit rules
//!
//! - Fixed-price work: deposit is 20% of the quoted total, rounded to a
//!   whole dollar; the remainder is due on completion.
//! - Hourly work (maintenance plans): the deposit is one hour of the rate
//!   and there is no arithmetic remainder; further hours are billed as
//!   work is completed.
//! - "Contact for Pricing" entries produce a zero quote that is never
//!   payment-collectible; callers route the customer to the contact flow.

pub mod catalog;
pub mod quote;
pub mod handoff;
pub mod view;
pub mod error;

pub use catalog::{Catalog, CatalogEntry, Price};
pub use error::{QuoteError, Result};
pub use handoff::{HandoffQuote, HandoffStore, MemoryHandoffStore, HANDOFF_KEY};
pub use quote::{derive_quote, Quote, Selection};
pub use view::{render_quote, QuoteView};
