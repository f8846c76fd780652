//! Stripe Webhook Handling
//!
//! Verifies provider signatures over the raw request body and reacts to
//! payment-intent lifecycle events. Each delivery is independent; the
//! provider redelivers on its own schedule, so handling must be safe
//! under at-least-once delivery. No durable state is mutated here; a
//! duplicate delivery at worst repeats a notification.

use std::sync::Arc;

use stripe::{Event, EventObject, EventType, Webhook, WebhookError};

use crate::error::{PaymentError, Result};
use crate::notify::{ConfirmationMailer, PaymentReceipt};

/// Classified webhook event
#[derive(Clone, Debug)]
pub enum PaymentEvent {
    /// Deposit collected; notify customer and operator.
    Succeeded { receipt: PaymentReceipt },

    /// Payment attempt failed; log only, the customer retries in-browser.
    Failed {
        intent_id: String,
        failure_message: Option<String>,
    },

    /// Anything else: acknowledged and ignored, forward-compatible.
    Other { event_type: String },
}

/// Webhook handler
pub struct WebhookHandler {
    mailer: Arc<ConfirmationMailer>,
}

impl WebhookHandler {
    pub fn new(mailer: Arc<ConfirmationMailer>) -> Self {
        Self { mailer }
    }

    /// Verify the signature over the raw body and parse the event.
    ///
    /// A signature failure is non-retriable from this side; the caller
    /// answers with a client error and the provider redelivers.
    pub fn verify(&self, payload: &str, signature: &str, secret: &str) -> Result<Event> {
        Webhook::construct_event(payload, signature, secret).map_err(|e| match e {
            WebhookError::BadParse(e) => PaymentError::WebhookParse(e.to_string()),
            other => PaymentError::WebhookSignature(other.to_string()),
        })
    }

    /// Process a verified event. Infallible by design: once the signature
    /// checks out the delivery is acknowledged no matter what downstream
    /// notification does.
    pub async fn handle(&self, event: Event) -> PaymentEvent {
        let classified = classify(&event);

        match &classified {
            PaymentEvent::Succeeded { receipt } => {
                tracing::info!(
                    intent_id = %receipt.intent_id,
                    amount_cents = receipt.amount_cents,
                    "Payment intent succeeded"
                );
                // Best-effort; errors are logged inside and swallowed.
                self.mailer.notify_payment(receipt).await;
            }
            PaymentEvent::Failed {
                intent_id,
                failure_message,
            } => {
                tracing::warn!(
                    intent_id = %intent_id,
                    reason = ?failure_message,
                    "Payment intent failed"
                );
            }
            PaymentEvent::Other { event_type } => {
                tracing::debug!(event_type = %event_type, "Unhandled webhook event");
            }
        }

        classified
    }
}

/// Classify a Stripe event. A payload whose object does not match its
/// event type is treated as unhandled rather than an error, so the
/// delivery still gets acknowledged.
pub fn classify(event: &Event) -> PaymentEvent {
    match event.type_ {
        EventType::PaymentIntentSucceeded => {
            if let EventObject::PaymentIntent(intent) = &event.data.object {
                PaymentEvent::Succeeded {
                    receipt: PaymentReceipt {
                        intent_id: intent.id.to_string(),
                        amount_cents: intent.amount,
                        currency: intent.currency.to_string(),
                        metadata: intent.metadata.clone(),
                    },
                }
            } else {
                tracing::warn!("payment_intent.succeeded without a payment intent object");
                PaymentEvent::Other {
                    event_type: format!("{:?}", event.type_),
                }
            }
        }

        EventType::PaymentIntentPaymentFailed => {
            if let EventObject::PaymentIntent(intent) = &event.data.object {
                PaymentEvent::Failed {
                    intent_id: intent.id.to_string(),
                    failure_message: intent
                        .last_payment_error
                        .as_ref()
                        .and_then(|e| e.message.clone()),
                }
            } else {
                tracing::warn!("payment_intent.payment_failed without a payment intent object");
                PaymentEvent::Other {
                    event_type: format!("{:?}", event.type_),
                }
            }
        }

        _ => PaymentEvent::Other {
            event_type: format!("{:?}", event.type_),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    use std::sync::Arc;

    const SECRET: &str = "whsec_test_secret";

    fn handler() -> (WebhookHandler, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let mailer = Arc::new(ConfirmationMailer::new(notifier.clone(), "me@example.com"));
        (WebhookHandler::new(mailer), notifier)
    }

    fn sign(payload: &str, secret: &str) -> String {
        let timestamp = chrono::Utc::now().timestamp();
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.{payload}").as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        format!("t={timestamp},v1={signature}")
    }

    fn intent_object(
        status: &str,
        metadata: serde_json::Value,
        last_payment_error: serde_json::Value,
    ) -> serde_json::Value {
        serde_json::json!({
            "id": "pi_3TestIntent",
            "object": "payment_intent",
            "amount": 60000,
            "amount_capturable": 0,
            "amount_received": 60000,
            "capture_method": "automatic",
            "client_secret": "pi_3TestIntent_secret_abc",
            "confirmation_method": "automatic",
            "created": chrono::Utc::now().timestamp(),
            "currency": "usd",
            "last_payment_error": last_payment_error,
            "livemode": false,
            "metadata": metadata,
            "payment_method_types": ["card"],
            "status": status,
        })
    }

    fn event_payload(event_type: &str, intent: serde_json::Value) -> String {
        serde_json::json!({
            "id": "evt_1TestEvent",
            "object": "event",
            "created": chrono::Utc::now().timestamp(),
            "data": { "object": intent },
            "livemode": false,
            "pending_webhooks": 1,
            "type": event_type,
        })
        .to_string()
    }

    fn succeeded_payload() -> String {
        event_payload(
            "payment_intent.succeeded",
            intent_object(
                "succeeded",
                serde_json::json!({
                    "email": "client@example.com",
                    "name": "Ada",
                    "service": "Website Development",
                }),
                serde_json::json!(null),
            ),
        )
    }

    async fn deliver(handler: &WebhookHandler, payload: &str) -> PaymentEvent {
        let signature = sign(payload, SECRET);
        let event = handler.verify(payload, &signature, SECRET).unwrap();
        handler.handle(event).await
    }

    #[test]
    fn invalid_signature_is_rejected_before_anything_else() {
        let (handler, notifier) = handler();
        let err = handler
            .verify("{}", "t=1,v1=deadbeef", SECRET)
            .unwrap_err();
        assert!(matches!(err, PaymentError::WebhookSignature(_)));
        assert!(notifier.sent().is_empty());
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let (handler, _) = handler();
        let payload = r#"{"hello":"world"}"#;
        let signature = sign(payload, "whsec_other_secret");
        let err = handler.verify(payload, &signature, SECRET).unwrap_err();
        assert!(matches!(err, PaymentError::WebhookSignature(_)));
    }

    #[test]
    fn valid_signature_over_non_event_payload_is_a_parse_error() {
        // Signature passes, so the failure must classify as parse, not
        // signature.
        let (handler, _) = handler();
        let payload = r#"{"hello":"world"}"#;
        let signature = sign(payload, SECRET);
        let err = handler.verify(payload, &signature, SECRET).unwrap_err();
        assert!(matches!(err, PaymentError::WebhookParse(_)));
    }

    #[tokio::test]
    async fn succeeded_event_notifies_both_parties() {
        let (handler, notifier) = handler();
        let outcome = deliver(&handler, &succeeded_payload()).await;

        match outcome {
            PaymentEvent::Succeeded { receipt } => {
                assert_eq!(receipt.intent_id, "pi_3TestIntent");
                assert_eq!(receipt.amount_cents, 60_000);
                assert_eq!(
                    receipt.metadata.get("email").map(String::as_str),
                    Some("client@example.com")
                );
            }
            other => panic!("expected a succeeded event, got {other:?}"),
        }

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().any(|m| m.to == "client@example.com"));
        assert!(sent.iter().any(|m| m.to == "me@example.com"));
    }

    #[tokio::test]
    async fn duplicate_delivery_notifies_again() {
        // At-least-once delivery: a redelivered success event repeats the
        // notification rather than corrupting anything.
        let (handler, notifier) = handler();
        let payload = succeeded_payload();
        deliver(&handler, &payload).await;
        deliver(&handler, &payload).await;
        assert_eq!(notifier.sent().len(), 4);
    }

    #[tokio::test]
    async fn notifier_failure_never_escapes() {
        let (handler, notifier) = handler();
        notifier.fail_sends();
        // Must complete without error even though both sends fail.
        let outcome = deliver(&handler, &succeeded_payload()).await;
        assert!(matches!(outcome, PaymentEvent::Succeeded { .. }));
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn failed_event_carries_the_decline_reason_and_sends_nothing() {
        let (handler, notifier) = handler();
        let payload = event_payload(
            "payment_intent.payment_failed",
            intent_object(
                "requires_payment_method",
                serde_json::json!({ "email": "client@example.com" }),
                serde_json::json!({
                    "code": "card_declined",
                    "message": "Your card was declined.",
                    "type": "card_error",
                }),
            ),
        );

        let outcome = deliver(&handler, &payload).await;
        match outcome {
            PaymentEvent::Failed {
                intent_id,
                failure_message,
            } => {
                assert_eq!(intent_id, "pi_3TestIntent");
                assert_eq!(failure_message.as_deref(), Some("Your card was declined."));
            }
            other => panic!("expected a failed event, got {other:?}"),
        }
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn unrelated_event_is_acknowledged_without_notifying() {
        let (handler, notifier) = handler();
        let payload = event_payload(
            "payment_intent.created",
            intent_object(
                "requires_payment_method",
                serde_json::json!({}),
                serde_json::json!(null),
            ),
        );

        let outcome = deliver(&handler, &payload).await;
        assert!(matches!(outcome, PaymentEvent::Other { .. }));
        assert!(notifier.sent().is_empty());
    }
}
