//! # Payment Intent Types

use serde::{Deserialize, Serialize};

/// Amount charged by the demo checkout, in the smallest currency unit
pub const DEFAULT_PAYMENT_AMOUNT: i64 = 1999;

/// Default currency when the client does not send one
pub const DEFAULT_CURRENCY: &str = "usd";

/// Parameters for creating a payment intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    /// Amount in the smallest currency unit
    pub amount: i64,
    /// Lowercase ISO currency code
    pub currency: String,
    /// Idempotency key forwarded to the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl PaymentIntentRequest {
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into().to_lowercase(),
            idempotency_key: None,
        }
    }

    /// Builder: set idempotency key
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// A created payment intent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Provider ID (pi_...)
    pub id: String,
    /// Secret handed to the browser to confirm the payment
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
    /// Provider status (requires_payment_method, succeeded, ...)
    #[serde(default)]
    pub status: Option<String>,
}
