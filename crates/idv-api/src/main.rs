//! # Identity Redirect RS
//!
//! Stripe Identity demo server.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//! export STATIC_DIR=../client
//!
//! # Run the server
//! identity-redirect
//! ```

use idv_api::{
    routes::{self, WEBHOOK_PATH},
    state::{AppConfig, AppState},
};
use idv_stripe::REQUIRED_WEBHOOK_EVENTS;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    // Initialize logging
    tracing_subscriber::registry()
        .with(config.json_logs.then(|| fmt::layer().json()))
        .with((!config.json_logs).then(fmt::layer))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::from_config(config)?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Static dir: {}", state.config.static_dir.display());
    if state.verifier.is_signed() {
        info!("Webhook signatures: verified");
    } else {
        warn!("Webhook signatures: NOT verified (ALLOW_UNSIGNED_WEBHOOKS)");
    }

    let app = routes::create_router(state);

    info!("Identity server listening on http://{}", addr);

    if !is_prod {
        info!("Webhook: POST http://{}{}", addr, WEBHOOK_PATH);
        info!(
            "Enable these events in the Stripe dashboard: {}",
            REQUIRED_WEBHOOK_EVENTS.join(", ")
        );
        info!("Local testing: stripe listen --forward-to http://{}{}", addr, WEBHOOK_PATH);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

fn print_banner() {
    println!(
        r#"
  Identity Redirect RS
  ━━━━━━━━━━━━━━━━━━━━━━━
  Stripe Identity demo server
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
