//! # studio-payments
//!
//! Payment processing for deposit collection: Stripe payment intents,
//! webhook verification, and confirmation emails.
//!
//! ## Intent lifecycle
//!
//! The intent is created *before* the customer's identity is known, so
//! the payment form can render the moment the payment page loads:
//!
//! ```text
//! ┌──────────────┐   create    ┌──────────────┐   update    ┌───────────┐
//! │ Payment page │────────────▶│ PaymentIntent│◀────────────│ Submit    │
//! │ loads quote  │  (deposit)  │ clientSecret │ (identity)  │ form      │
//! └──────────────┘             └──────┬───────┘             └───────────┘
//!                                     │ webhook: succeeded / failed
//!                                     ▼
//!                            ┌────────────────┐
//!                            │ WebhookHandler │──▶ ConfirmationMailer
//!                            │ (verify + ack) │    (two best-effort sends)
//!                            └────────────────┘
//! ```
//!
//! The webhook acknowledgment never depends on the email provider: once
//! the signature verifies, the delivery is acknowledged and notification
//! failures are logged and swallowed.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use studio_payments::{PaymentGateway, IntentRequest};
//! use stripe::Currency;
//!
//! let gateway = PaymentGateway::new("sk_test_xxx", "whsec_xxx");
//! let handle = gateway
//!     .create_intent(IntentRequest::new(60_000, Currency::USD))
//!     .await?;
//! // Hand handle.client_secret to the browser.
//! ```

mod gateway;
mod notify;
mod webhook;
mod error;

pub use error::{PaymentError, Result};
pub use gateway::{IntentHandle, IntentRequest, PaymentGateway};
pub use notify::{
    ConfirmationMailer, DisabledNotifier, EmailMessage, Notifier, PaymentReceipt,
    RecordingNotifier, ResendNotifier,
};
pub use webhook::{classify, PaymentEvent, WebhookHandler};
