//! Portfolio Backend Server
//!
//! Axum server behind the portfolio site's payment flow: creates and
//! updates Stripe payment intents for quoted deposits, receives the
//! provider webhook, and sends confirmation emails.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studio_payments::{
    ConfirmationMailer, DisabledNotifier, Notifier, PaymentGateway, ResendNotifier,
};

use crate::handlers::{
    create_payment_intent, health_check, stripe_webhook, submit_project, update_payment_intent,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Initialize payments
    let gateway = match PaymentGateway::from_env() {
        Ok(gateway) => {
            tracing::info!("✓ Stripe configured");
            Some(Arc::new(gateway))
        }
        Err(e) => {
            tracing::warn!("⚠ Stripe not configured - payment routes disabled: {e}");
            tracing::warn!("  Set STRIPE_SECRET_KEY and STRIPE_WEBHOOK_SECRET in .env");
            None
        }
    };

    // Initialize the confirmation mailer
    let (notifier, notifier_configured): (Arc<dyn Notifier>, bool) =
        match ResendNotifier::from_env() {
            Ok(notifier) => {
                tracing::info!("✓ Email notifications configured");
                (Arc::new(notifier), true)
            }
            Err(e) => {
                tracing::warn!("⚠ Email not configured - confirmations will be dropped: {e}");
                tracing::warn!("  Set RESEND_API_KEY in .env");
                (Arc::new(DisabledNotifier), false)
            }
        };

    let operator_email =
        std::env::var("OPERATOR_EMAIL").unwrap_or_else(|_| "operator@localhost".into());
    let mailer = Arc::new(ConfirmationMailer::new(notifier, operator_email));

    // Build application state
    let state = AppState {
        gateway,
        mailer,
        notifier_configured,
    };

    // CORS configuration: permissive, preflight short-circuits in the layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health & info
        .route("/health", get(health_check))
        // Payments
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/update-payment-intent", post(update_payment_intent))
        .route("/webhook", post(stripe_webhook))
        // Project submissions
        .route("/api/submit-project", post(submit_project))
        // Static site
        .fallback_service(tower_http::services::ServeDir::new("static"))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 studio-server running on http://{}", addr);
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                 - Health check");
    tracing::info!("  POST /create-payment-intent  - Create deposit payment intent");
    tracing::info!("  POST /update-payment-intent  - Attach customer metadata");
    tracing::info!("  POST /api/submit-project     - Project submission");
    tracing::info!("  POST /webhook                - Stripe webhook");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
