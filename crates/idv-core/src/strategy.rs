//! # Provider Strategy Traits
//!
//! Seams between the HTTP layer and the identity provider.
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │       Verifier (trait)       │   │ PaymentIntentStrategy (trait)│
//! │  └── verify()                │   │  └── create_payment_intent() │
//! └──────────────────────────────┘   └──────────────────────────────┘
//!         ▲               ▲                          ▲
//!  ┌──────┴──────┐ ┌──────┴──────┐           ┌───────┴───────┐
//!  │  Signed     │ │  Trusting   │           │ StripePayment │
//!  │  Verifier   │ │  Verifier   │           │   Intents     │
//!  └─────────────┘ └─────────────┘           └───────────────┘
//! ```
//!
//! A verifier is chosen once at startup from configuration and shared
//! behind an `Arc`; handlers never branch on signing mode per request.

use crate::error::IdentityResult;
use crate::event::VerificationEvent;
use crate::payment::{PaymentIntent, PaymentIntentRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Authenticates a raw webhook body and parses it into an event.
pub trait Verifier: Send + Sync {
    /// Verify `payload` against `signature` and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw request body bytes, exactly as received
    /// * `signature` - Signature header value, if the request carried one
    fn verify(&self, payload: &[u8], signature: Option<&str>) -> IdentityResult<VerificationEvent>;

    /// Whether this verifier checks signatures at all
    fn is_signed(&self) -> bool;
}

/// Shared verifier (dynamic dispatch)
pub type BoxedVerifier = Arc<dyn Verifier>;

/// Creates payment intents with a provider.
#[async_trait]
pub trait PaymentIntentStrategy: Send + Sync {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> IdentityResult<PaymentIntent>;

    /// Get the provider name (for logging and errors).
    fn provider_name(&self) -> &'static str;
}

/// Shared payment intent strategy (dynamic dispatch)
pub type BoxedPaymentIntentStrategy = Arc<dyn PaymentIntentStrategy>;
