//! # Application State
//!
//! Shared state for the Axum application.
//! Everything a handler needs is constructed here once and passed in; there
//! is no process-global client or config.

use idv_core::{BoxedPaymentIntentStrategy, BoxedVerifier, DEFAULT_PAYMENT_AMOUNT};
use idv_stripe::signature::DEFAULT_TOLERANCE_SECS;
use idv_stripe::{
    select_verifier, LoggingVerificationHandler, StripeConfig, StripePaymentIntents,
    VerificationHandler,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory holding the web client (index.html and assets)
    pub static_dir: PathBuf,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Accept webhooks without a signing secret
    pub allow_unsigned_webhooks: bool,
    /// Signature timestamp tolerance in seconds
    pub webhook_tolerance_secs: i64,
    /// Payment intent amount in the smallest currency unit
    pub payment_amount: i64,
    /// Emit JSON log lines
    pub json_logs: bool,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| {
            lookup(key)
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false)
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(4242),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            allow_unsigned_webhooks: flag("ALLOW_UNSIGNED_WEBHOOKS"),
            webhook_tolerance_secs: lookup("WEBHOOK_TOLERANCE_SECS")
                .and_then(|t| t.parse().ok())
                .unwrap_or(DEFAULT_TOLERANCE_SECS),
            payment_amount: lookup("PAYMENT_AMOUNT")
                .and_then(|a| a.parse().ok())
                .unwrap_or(DEFAULT_PAYMENT_AMOUNT),
            json_logs: lookup("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Key handed to the browser client
    pub publishable_key: String,
    /// Webhook authenticity strategy, fixed at startup
    pub verifier: BoxedVerifier,
    /// Payment intent provider
    pub payments: BoxedPaymentIntentStrategy,
    /// Receives dispatched verification events
    pub handler: Arc<dyn VerificationHandler>,
}

impl AppState {
    /// Build state from config plus Stripe settings in the environment
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let stripe = StripeConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load Stripe config: {}", e))?;

        let verifier = select_verifier(
            stripe.webhook_secret.as_deref(),
            config.allow_unsigned_webhooks,
            config.webhook_tolerance_secs,
        )?;

        info!(
            "Stripe mode: {}",
            if stripe.is_live_mode() { "live" } else { "test" }
        );
        if config.is_production() && !stripe.is_live_mode() {
            warn!("Production environment is running with Stripe test keys");
        }

        let publishable_key = stripe.publishable_key.clone();
        let payments = StripePaymentIntents::new(stripe)
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        Ok(Self::from_parts(
            config,
            publishable_key,
            verifier,
            Arc::new(payments),
            Arc::new(LoggingVerificationHandler),
        ))
    }

    /// Assemble state from explicit parts
    pub fn from_parts(
        config: AppConfig,
        publishable_key: impl Into<String>,
        verifier: BoxedVerifier,
        payments: BoxedPaymentIntentStrategy,
        handler: Arc<dyn VerificationHandler>,
    ) -> Self {
        Self {
            config,
            publishable_key: publishable_key.into(),
            verifier,
            payments,
            handler,
        }
    }
}
