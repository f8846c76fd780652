//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Requested charge amount is not a positive number of cents
    #[error("Invalid amount: {0} cents")]
    InvalidAmount(i64),

    /// Stripe API error
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// Payment intent id did not parse
    #[error("Invalid payment intent id: {0}")]
    InvalidIntentId(String),

    /// Webhook signature verification failed
    #[error("Webhook signature invalid: {0}")]
    WebhookSignature(String),

    /// Webhook payload parsing failed
    #[error("Webhook parse error: {0}")]
    WebhookParse(String),

    /// Email provider rejected a notification
    #[error("Notification error: {0}")]
    Notify(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PaymentError {
    /// Get user-friendly message; provider internals stay server-side
    pub fn user_message(&self) -> &str {
        match self {
            PaymentError::InvalidAmount(_) => "Invalid payment amount.",
            PaymentError::Stripe(_) => "Payment processing failed. Please try again.",
            PaymentError::InvalidIntentId(_) => "Unknown payment reference.",
            PaymentError::WebhookSignature(_) | PaymentError::WebhookParse(_) => {
                "Invalid webhook request."
            }
            PaymentError::Notify(_) => "Confirmation email could not be sent.",
            PaymentError::Config(_) => "Service configuration error.",
        }
    }
}
