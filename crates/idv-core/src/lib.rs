//! # idv-core
//!
//! Core types and traits for the identity-redirect verification server.
//!
//! This crate provides:
//! - `VerificationEvent`, `EventKind`, `FailureCode` for webhook events
//! - `Verifier` trait for webhook authenticity strategies
//! - `PaymentIntentStrategy` trait for payment providers
//! - `IdentityError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use idv_core::{EventKind, FailureCode, Verifier};
//!
//! let event = verifier.verify(&body, signature)?;
//! if event.event_type == EventKind::RequiresInput {
//!     let session = event.session()?;
//!     // inspect session.last_error
//! }
//! ```

pub mod error;
pub mod event;
pub mod payment;
pub mod strategy;

// Re-exports for convenience
pub use error::{IdentityError, IdentityResult};
pub use event::{EventKind, FailureCode, LastError, VerificationEvent, VerificationSession};
pub use payment::{PaymentIntent, PaymentIntentRequest, DEFAULT_CURRENCY, DEFAULT_PAYMENT_AMOUNT};
pub use strategy::{BoxedPaymentIntentStrategy, BoxedVerifier, PaymentIntentStrategy, Verifier};
