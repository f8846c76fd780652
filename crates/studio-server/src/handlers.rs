//! HTTP Handlers

use std::collections::HashMap;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use stripe::Currency;

use quote_engine::{derive_quote, Quote, Selection};
use studio_payments::{IntentRequest, PaymentError, WebhookHandler};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stripe_configured: bool,
    pub notifier_configured: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    /// Deposit amount in cents
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIntentRequest {
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIntentResponse {
    pub success: bool,
    pub payment_intent_id: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitProjectResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn payments_disabled() -> ApiError {
    api_error(StatusCode::SERVICE_UNAVAILABLE, "Payments not configured")
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        stripe_configured: state.gateway.is_some(),
        notifier_configured: state.notifier_configured,
    })
}

/// Create a payment intent for the quoted deposit.
///
/// Called at payment-page load, before the customer's identity is known,
/// so only project metadata rides along here.
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(payload): Json<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>, ApiError> {
    let gateway = state.gateway.as_ref().ok_or_else(payments_disabled)?;

    let metadata = payload.metadata.unwrap_or_default();

    // The charged amount comes from the quote the payment page loaded;
    // when the selection keys ride along in metadata, cross-check it
    // against the catalog and flag drift without rejecting.
    if let Some(expected) = catalog_deposit_cents(&metadata) {
        if expected != payload.amount {
            tracing::warn!(
                requested = payload.amount,
                expected,
                "Requested deposit differs from catalog-derived deposit"
            );
        }
    }

    let currency = parse_currency(payload.currency.as_deref());
    let request = IntentRequest {
        amount_cents: payload.amount,
        currency,
        metadata,
    };

    let handle = gateway.create_intent(request).await.map_err(|e| {
        tracing::error!(error = %e, amount = payload.amount, "Create intent failed");
        match e {
            PaymentError::InvalidAmount(_) => {
                api_error(StatusCode::BAD_REQUEST, e.user_message())
            }
            _ => api_error(StatusCode::INTERNAL_SERVER_ERROR, e.user_message()),
        }
    })?;

    Ok(Json(CreateIntentResponse {
        client_secret: handle.client_secret,
    }))
}

/// Attach customer metadata to an existing intent before confirmation.
pub async fn update_payment_intent(
    State(state): State<AppState>,
    Json(payload): Json<UpdateIntentRequest>,
) -> Result<Json<UpdateIntentResponse>, ApiError> {
    let gateway = state.gateway.as_ref().ok_or_else(payments_disabled)?;

    let intent_id = match payload.payment_intent_id.as_deref() {
        Some(id) if !id.is_empty() => id,
        _ => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "paymentIntentId is required",
            ))
        }
    };

    gateway
        .update_intent(intent_id, payload.metadata)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, intent_id = %intent_id, "Update intent failed");
            match e {
                PaymentError::InvalidIntentId(_) => {
                    api_error(StatusCode::BAD_REQUEST, e.user_message())
                }
                _ => api_error(StatusCode::INTERNAL_SERVER_ERROR, e.user_message()),
            }
        })?;

    Ok(Json(UpdateIntentResponse {
        success: true,
        payment_intent_id: intent_id.to_string(),
    }))
}

/// Accept a project submission. Acknowledgment only; the durable record
/// is the payment intent's metadata.
pub async fn submit_project(
    Json(payload): Json<serde_json::Value>,
) -> Json<SubmitProjectResponse> {
    let submission_id = uuid::Uuid::new_v4();
    tracing::info!(submission_id = %submission_id, data = %payload, "Project submission received");

    Json(SubmitProjectResponse {
        success: true,
        message: "Project data received successfully",
        data: payload,
    })
}

/// Stripe webhook endpoint.
///
/// Body must stay raw for signature verification. Once the signature
/// verifies, the delivery is acknowledged regardless of what downstream
/// notification does.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    let gateway = state.gateway.as_ref().ok_or_else(payments_disabled)?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing Stripe signature"))?;

    let handler = WebhookHandler::new(state.mailer.clone());

    let event = handler
        .verify(&body, signature, gateway.webhook_secret())
        .map_err(|e| {
            tracing::warn!(error = %e, "Webhook verification failed");
            api_error(StatusCode::BAD_REQUEST, e.user_message())
        })?;

    handler.handle(event).await;

    Ok(Json(WebhookResponse { received: true }))
}

/// Re-derive the deposit from the catalog when the metadata carries the
/// selection keys; None when it does not (older clients send labels only).
fn catalog_deposit_cents(metadata: &HashMap<String, String>) -> Option<i64> {
    let service = metadata.get("serviceValue")?;
    let complexity = metadata.get("complexityValue")?;

    let mut selection = Selection::new(service, complexity);
    if let Some(tier) = metadata.get("tierValue") {
        selection = selection.with_tier(tier);
    }

    derive_quote(&selection)
        .ok()
        .filter(Quote::payment_collectible)
        .map(|quote| quote.deposit_cents())
}

fn parse_currency(currency: Option<&str>) -> Currency {
    match currency.map(str::to_lowercase).as_deref() {
        Some("eur") => Currency::EUR,
        Some("gbp") => Currency::GBP,
        Some("cad") => Currency::CAD,
        // Default charge currency
        _ => Currency::USD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_cross_check_rederives_deposit() {
        let metadata = HashMap::from([
            ("serviceValue".to_string(), "website".to_string()),
            ("complexityValue".to_string(), "basic".to_string()),
        ]);
        assert_eq!(catalog_deposit_cents(&metadata), Some(60_000));

        let tiered = HashMap::from([
            ("serviceValue".to_string(), "website".to_string()),
            ("complexityValue".to_string(), "shopify".to_string()),
            ("tierValue".to_string(), "growth".to_string()),
        ]);
        assert_eq!(catalog_deposit_cents(&tiered), Some(100_000));
    }

    #[test]
    fn catalog_cross_check_skips_label_only_metadata() {
        let metadata = HashMap::from([
            ("service".to_string(), "Website Development".to_string()),
            ("complexity".to_string(), "Basic Custom-Built".to_string()),
        ]);
        assert_eq!(catalog_deposit_cents(&metadata), None);
    }

    #[test]
    fn catalog_cross_check_ignores_contact_selections() {
        let metadata = HashMap::from([
            ("serviceValue".to_string(), "ai".to_string()),
            ("complexityValue".to_string(), "enterprise".to_string()),
        ]);
        assert_eq!(catalog_deposit_cents(&metadata), None);
    }

    #[test]
    fn currency_parsing_defaults_to_usd() {
        assert_eq!(parse_currency(None), Currency::USD);
        assert_eq!(parse_currency(Some("USD")), Currency::USD);
        assert_eq!(parse_currency(Some("eur")), Currency::EUR);
        assert_eq!(parse_currency(Some("doubloons")), Currency::USD);
    }

    #[test]
    fn update_request_uses_camel_case() {
        let payload: UpdateIntentRequest = serde_json::from_str(
            r#"{"paymentIntentId":"pi_123","metadata":{"name":"Ada"}}"#,
        )
        .unwrap();
        assert_eq!(payload.payment_intent_id.as_deref(), Some("pi_123"));
        assert_eq!(payload.metadata.get("name").map(String::as_str), Some("Ada"));
    }

    #[test]
    fn update_request_tolerates_missing_id() {
        let payload: UpdateIntentRequest =
            serde_json::from_str(r#"{"metadata":{}}"#).unwrap();
        assert!(payload.payment_intent_id.is_none());
    }

    #[test]
    fn intent_response_serializes_client_secret_camel_case() {
        let response = CreateIntentResponse {
            client_secret: "pi_123_secret_abc".into(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["clientSecret"], "pi_123_secret_abc");
    }
}
