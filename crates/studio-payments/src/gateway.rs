//! Payment-Intent Gateway
//!
//! Thin wrapper over Stripe payment intents. An intent is created at
//! quote-display time so the payment form can render immediately, then
//! updated once with the customer's identity at submission time, before
//! the browser confirms the payment.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use stripe::{
    Client, CreatePaymentIntent, CreatePaymentIntentAutomaticPaymentMethods, Currency,
    PaymentIntent, PaymentIntentId, UpdatePaymentIntent,
};

use crate::error::{PaymentError, Result};

/// Stripe client wrapper owning the API and webhook signing secrets.
pub struct PaymentGateway {
    client: Client,
    webhook_secret: String,
}

impl PaymentGateway {
    /// Create a new gateway
    pub fn new(secret_key: &str, webhook_secret: &str) -> Self {
        Self {
            client: Client::new(secret_key),
            webhook_secret: webhook_secret.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| PaymentError::Config("STRIPE_SECRET_KEY not set".into()))?;
        let webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET")
            .map_err(|_| PaymentError::Config("STRIPE_WEBHOOK_SECRET not set".into()))?;

        Ok(Self::new(&secret_key, &webhook_secret))
    }

    /// Get the webhook signing secret
    pub fn webhook_secret(&self) -> &str {
        &self.webhook_secret
    }

    /// Create a payment intent for the deposit amount.
    ///
    /// The amount must be a positive number of minor units; that is
    /// checked here, before any provider call, so a bad request never
    /// leaves the process.
    pub async fn create_intent(&self, request: IntentRequest) -> Result<IntentHandle> {
        if request.amount_cents <= 0 {
            return Err(PaymentError::InvalidAmount(request.amount_cents));
        }

        let mut params = CreatePaymentIntent::new(request.amount_cents, request.currency);
        params.automatic_payment_methods = Some(CreatePaymentIntentAutomaticPaymentMethods {
            enabled: true,
            ..Default::default()
        });
        if !request.metadata.is_empty() {
            params.metadata = Some(request.metadata);
        }

        let intent = PaymentIntent::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        let client_secret = intent
            .client_secret
            .ok_or_else(|| PaymentError::Stripe("No client secret returned".into()))?;

        tracing::info!(
            intent_id = %intent.id,
            amount_cents = request.amount_cents,
            "Created payment intent"
        );

        Ok(IntentHandle {
            intent_id: intent.id.to_string(),
            client_secret,
        })
    }

    /// Attach customer metadata to an existing intent.
    ///
    /// Idempotent: Stripe replaces the given metadata keys wholesale, so
    /// repeating the call with the same map leaves the same stored state.
    pub async fn update_intent(
        &self,
        intent_id: &str,
        metadata: HashMap<String, String>,
    ) -> Result<()> {
        let id: PaymentIntentId = intent_id
            .parse()
            .map_err(|_| PaymentError::InvalidIntentId(intent_id.to_string()))?;

        let params = UpdatePaymentIntent {
            metadata: Some(metadata),
            ..Default::default()
        };

        PaymentIntent::update(&self.client, &id, params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        tracing::info!(intent_id = %id, "Updated payment intent metadata");
        Ok(())
    }

    /// Get the underlying Stripe client
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Request to create a payment intent
#[derive(Clone, Debug)]
pub struct IntentRequest {
    /// Deposit amount in minor units (cents)
    pub amount_cents: i64,

    /// Charge currency
    pub currency: Currency,

    /// Project metadata known at quote-display time
    pub metadata: HashMap<String, String>,
}

impl IntentRequest {
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
            metadata: HashMap::new(),
        }
    }
}

/// Reference to a created intent; the secret is what the browser needs
/// to mount the payment element.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntentHandle {
    pub intent_id: String,
    pub client_secret: String,
}
