//! # idv-stripe
//!
//! Stripe Identity integration for identity-redirect-rs.
//!
//! This crate provides:
//!
//! 1. **SignedVerifier / TrustingVerifier** - webhook authenticity strategies
//!    - `SignedVerifier` checks `Stripe-Signature` with the signing secret
//!    - `TrustingVerifier` accepts unsigned bodies (local development only)
//!
//! 2. **dispatch_verification_event** - routes verification session events
//!    to a `VerificationHandler`
//!
//! 3. **StripePaymentIntents** - PaymentIntents API client
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use idv_stripe::{select_verifier, dispatch_verification_event, LoggingVerificationHandler};
//!
//! // Once at startup
//! let verifier = select_verifier(config.webhook_secret.as_deref(), false, 300)?;
//!
//! // In your webhook endpoint:
//! let event = verifier.verify(&body, signature)?;
//! dispatch_verification_event(&LoggingVerificationHandler, &event)?;
//! ```

pub mod config;
pub mod payment_intent;
pub mod signature;
pub mod webhook;

// Re-exports
pub use config::StripeConfig;
pub use payment_intent::StripePaymentIntents;
pub use signature::{
    select_verifier, signature_header, SignedVerifier, TrustingVerifier, SIGNATURE_HEADER,
};
pub use webhook::{
    dispatch_verification_event, DispatchOutcome, LoggingVerificationHandler, VerificationHandler,
    REQUIRED_WEBHOOK_EVENTS,
};
