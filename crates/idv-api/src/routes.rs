//! # Routes
//!
//! Axum router configuration for the identity verification API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// Path Stripe posts webhook events to
pub const WEBHOOK_PATH: &str = "/webhook";

/// Create the main application router
///
/// Routes:
///   - GET  /                      - Web client (STATIC_DIR/index.html)
///   - GET  /health                - Health check
///   - GET  /config                - Publishable key
///   - POST /create-payment-intent - Create payment intent
///   - POST /webhook               - Stripe webhook handler
///   - GET  /*                     - Static assets from STATIC_DIR
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_dir = state.config.static_dir.clone();
    let index = ServeFile::new(static_dir.join("index.html"));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/create-payment-intent", post(handlers::create_payment_intent))
        // Webhook body must reach the handler as raw bytes
        .route(WEBHOOK_PATH, post(handlers::webhook))
        // Web client
        .route_service("/", index)
        .fallback_service(ServeDir::new(static_dir))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
