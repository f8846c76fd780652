//! Application State

use std::sync::Arc;

use studio_payments::{ConfirmationMailer, PaymentGateway};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Stripe gateway (None if not configured; payment routes answer 503)
    pub gateway: Option<Arc<PaymentGateway>>,

    /// Confirmation mailer; backed by a disabled notifier when no email
    /// provider is configured
    pub mailer: Arc<ConfirmationMailer>,

    /// Whether a real email provider is wired up
    pub notifier_configured: bool,
}
