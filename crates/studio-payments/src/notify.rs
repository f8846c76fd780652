//! Confirmation Notifier
//!
//! Sends the post-payment emails: a confirmation to the customer and a
//! notification to the operator. Both sends are independent best-effort
//! calls; a failure in one never blocks the other and never reaches the
//! webhook acknowledgment.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;

use crate::error::{PaymentError, Result};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// A single outbound email.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound email transport.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Notifier backed by the Resend REST API.
pub struct ResendNotifier {
    http: reqwest::Client,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

impl ResendNotifier {
    pub fn new(api_key: &str, from: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            from: from.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("RESEND_API_KEY")
            .map_err(|_| PaymentError::Config("RESEND_API_KEY not set".into()))?;
        let from = std::env::var("NOTIFY_FROM")
            .unwrap_or_else(|_| "Studio <onboarding@resend.dev>".into());
        Ok(Self::new(&api_key, &from))
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let request = ResendRequest {
            from: &self.from,
            to: [message.to.as_str()],
            subject: &message.subject,
            text: &message.body,
        };

        let response = self
            .http
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PaymentError::Notify(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Notify(format!("{status}: {body}")));
        }

        Ok(())
    }
}

/// Notifier that records every message instead of sending it. Mirrors the
/// mock-client pattern used for outbound providers elsewhere; also useful
/// as a stand-in when no email provider is configured.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: std::sync::Mutex<Vec<EmailMessage>>,
    fail: std::sync::atomic::AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail.
    pub fn fail_sends(&self) {
        self.fail.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(PaymentError::Notify("send disabled".into()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Fallback notifier used when no email provider is configured: warns
/// and drops the message so the webhook path still acknowledges.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        tracing::warn!(to = %message.to, subject = %message.subject, "Email provider not configured; dropping message");
        Ok(())
    }
}

/// Everything known about a completed deposit payment, pulled from the
/// intent's metadata by the webhook handler.
#[derive(Clone, Debug)]
pub struct PaymentReceipt {
    pub intent_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub metadata: HashMap<String, String>,
}

impl PaymentReceipt {
    fn field(&self, key: &str) -> &str {
        self.metadata.get(key).map_or("-", String::as_str)
    }

    fn amount_display(&self) -> String {
        format!(
            "${}.{:02} {}",
            self.amount_cents / 100,
            self.amount_cents.rem_euclid(100),
            self.currency.to_uppercase()
        )
    }
}

/// Composes and dispatches the two confirmation messages.
pub struct ConfirmationMailer {
    notifier: Arc<dyn Notifier>,
    operator_email: String,
}

impl ConfirmationMailer {
    pub fn new(notifier: Arc<dyn Notifier>, operator_email: impl Into<String>) -> Self {
        Self {
            notifier,
            operator_email: operator_email.into(),
        }
    }

    /// Send both messages for a completed payment. Each send is
    /// best-effort: failures are logged and swallowed so the webhook
    /// acknowledgment can never depend on the email provider.
    pub async fn notify_payment(&self, receipt: &PaymentReceipt) {
        let customer = self.customer_message(receipt);
        let operator = self.operator_message(receipt);

        let customer_send = async {
            match customer {
                Some(message) => self.notifier.send(&message).await,
                None => {
                    tracing::warn!(
                        intent_id = %receipt.intent_id,
                        "No customer email in intent metadata; skipping confirmation"
                    );
                    Ok(())
                }
            }
        };
        let operator_send = self.notifier.send(&operator);

        let (customer_result, operator_result) = tokio::join!(customer_send, operator_send);

        if let Err(e) = customer_result {
            tracing::error!(intent_id = %receipt.intent_id, error = %e, "Customer confirmation failed");
        }
        if let Err(e) = operator_result {
            tracing::error!(intent_id = %receipt.intent_id, error = %e, "Operator notification failed");
        }
    }

    /// Customer-facing confirmation; None when the intent metadata never
    /// captured an email address.
    pub fn customer_message(&self, receipt: &PaymentReceipt) -> Option<EmailMessage> {
        let to = receipt.metadata.get("email")?.clone();
        let name = receipt.field("name");

        let body = format!(
            "Hi {name},\n\n\
             Thank you! Your deposit of {amount} has been received.\n\n\
             Project: {service} - {complexity}\n\
             Total cost: ${total}\n\
             Remaining balance: ${remaining}\n\n\
             I'll follow up with you shortly to discuss the details.\n",
            amount = receipt.amount_display(),
            service = receipt.field("service"),
            complexity = receipt.field("complexity"),
            total = receipt.field("totalCost"),
            remaining = receipt.field("remainingAmount"),
        );

        Some(EmailMessage {
            to,
            subject: "Deposit received - thank you!".into(),
            body,
        })
    }

    /// Operator-facing notification with the full submission.
    pub fn operator_message(&self, receipt: &PaymentReceipt) -> EmailMessage {
        let body = format!(
            "New deposit payment at {time}\n\n\
             Amount: {amount}\n\
             Intent: {intent}\n\n\
             Customer: {name}\n\
             Email: {email}\n\
             Phone: {phone}\n\n\
             Service: {service}\n\
             Complexity: {complexity}\n\
             Tier: {tier}\n\
             Total cost: ${total}\n\
             Remaining: ${remaining}\n\
             Hourly: {hourly}\n\n\
             Description:\n{description}\n",
            time = Utc::now().to_rfc3339(),
            amount = receipt.amount_display(),
            intent = receipt.intent_id,
            name = receipt.field("name"),
            email = receipt.field("email"),
            phone = receipt.field("phone"),
            service = receipt.field("service"),
            complexity = receipt.field("complexity"),
            tier = receipt.field("tier"),
            total = receipt.field("totalCost"),
            remaining = receipt.field("remainingAmount"),
            hourly = receipt.field("isHourlyRate"),
            description = receipt.field("projectDescription"),
        );

        EmailMessage {
            to: self.operator_email.clone(),
            subject: "New deposit payment received".into(),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt_with_email() -> PaymentReceipt {
        PaymentReceipt {
            intent_id: "pi_123".into(),
            amount_cents: 60_000,
            currency: "usd".into(),
            metadata: HashMap::from([
                ("email".into(), "client@example.com".into()),
                ("name".into(), "Ada".into()),
                ("service".into(), "Website Development".into()),
                ("complexity".into(), "Basic Custom-Built".into()),
                ("totalCost".into(), "3000".into()),
                ("remainingAmount".into(), "2400".into()),
            ]),
        }
    }

    #[tokio::test]
    async fn sends_customer_and_operator_messages() {
        let notifier = Arc::new(RecordingNotifier::new());
        let mailer = ConfirmationMailer::new(notifier.clone(), "me@example.com");

        mailer.notify_payment(&receipt_with_email()).await;

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().any(|m| m.to == "client@example.com"));
        assert!(sent.iter().any(|m| m.to == "me@example.com"));
    }

    #[tokio::test]
    async fn missing_customer_email_still_notifies_operator() {
        let notifier = Arc::new(RecordingNotifier::new());
        let mailer = ConfirmationMailer::new(notifier.clone(), "me@example.com");

        let mut receipt = receipt_with_email();
        receipt.metadata.remove("email");
        mailer.notify_payment(&receipt).await;

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "me@example.com");
    }

    #[tokio::test]
    async fn send_failures_are_swallowed() {
        let notifier = Arc::new(RecordingNotifier::new());
        notifier.fail_sends();
        let mailer = ConfirmationMailer::new(notifier.clone(), "me@example.com");

        // Must not panic or propagate
        mailer.notify_payment(&receipt_with_email()).await;
        assert!(notifier.sent().is_empty());
    }

    #[test]
    fn customer_message_includes_amount_and_project() {
        let notifier = Arc::new(RecordingNotifier::new());
        let mailer = ConfirmationMailer::new(notifier, "me@example.com");

        let message = mailer.customer_message(&receipt_with_email()).unwrap();
        assert_eq!(message.to, "client@example.com");
        assert!(message.body.contains("$600.00 USD"));
        assert!(message.body.contains("Website Development"));
    }
}
