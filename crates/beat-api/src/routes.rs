//! # Routes
//!
//! Axum router configuration for the beat store. Three JSON endpoints plus
//! static storefront assets; webhooks must receive the raw body, so no body
//! middleware sits in front of them.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - POST /create-checkout-session - Create a hosted checkout session
/// - POST /webhook - Stripe payment-event webhook (raw body)
/// - GET  /verify-session - Session status for the success page
/// - GET  /health - Health check
/// - *    - Static storefront assets
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_assets = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/create-checkout-session",
            post(handlers::create_checkout_session),
        )
        .route("/webhook", post(handlers::stripe_webhook))
        .route("/verify-session", get(handlers::verify_session))
        .fallback_service(static_assets)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
