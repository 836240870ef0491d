//! # Stripe PaymentIntents
//!
//! Implementation of the Stripe PaymentIntents create call.

use crate::config::StripeConfig;
use async_trait::async_trait;
use idv_core::{IdentityError, IdentityResult, PaymentIntent, PaymentIntentRequest, PaymentIntentStrategy};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Stripe PaymentIntents strategy
pub struct StripePaymentIntents {
    config: StripeConfig,
    client: Client,
}

impl StripePaymentIntents {
    /// Create a new PaymentIntents strategy
    pub fn new(config: StripeConfig) -> IdentityResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| IdentityError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl PaymentIntentStrategy for StripePaymentIntents {
    #[instrument(skip(self, request), fields(amount = request.amount, currency = %request.currency))]
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> IdentityResult<PaymentIntent> {
        if request.amount <= 0 {
            return Err(IdentityError::InvalidRequest(
                "Amount must be positive".to_string(),
            ));
        }

        if request.currency.is_empty() {
            return Err(IdentityError::InvalidRequest(
                "Currency is required".to_string(),
            ));
        }

        let idempotency_key = request
            .idempotency_key
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let form_params = [
            ("amount", request.amount.to_string()),
            ("currency", request.currency.clone()),
        ];

        let url = format!("{}/v1/payment_intents", self.config.api_base_url);
        debug!("Creating Stripe payment intent: url={}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &idempotency_key)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| IdentityError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(IdentityError::ProviderError {
                    provider: self.provider_name().to_string(),
                    message: error_response.error.message,
                });
            }

            return Err(IdentityError::ProviderError {
                provider: self.provider_name().to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let intent: StripePaymentIntentResponse = serde_json::from_str(&body).map_err(|e| {
            IdentityError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!("Created Stripe payment intent: id={}", intent.id);

        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
            amount: intent.amount,
            currency: intent.currency,
            status: intent.status,
        })
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripePaymentIntentResponse {
    id: String,
    client_secret: String,
    amount: i64,
    currency: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn strategy_for(server: &MockServer) -> StripePaymentIntents {
        let config = StripeConfig::new("sk_test_abc123", "pk_test_xyz789")
            .with_api_base_url(server.uri());
        StripePaymentIntents::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_create_payment_intent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .and(header("Authorization", "Bearer sk_test_abc123"))
            .and(header("Stripe-Version", "2020-08-27"))
            .and(header_exists("Idempotency-Key"))
            .and(body_string_contains("amount=1999"))
            .and(body_string_contains("currency=usd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pi_123",
                "object": "payment_intent",
                "client_secret": "pi_123_secret_456",
                "amount": 1999,
                "currency": "usd",
                "status": "requires_payment_method"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let intent = strategy_for(&server)
            .create_payment_intent(&PaymentIntentRequest::new(1999, "usd"))
            .await
            .unwrap();

        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.client_secret, "pi_123_secret_456");
        assert_eq!(intent.status.as_deref(), Some("requires_payment_method"));
    }

    #[tokio::test]
    async fn test_forwards_idempotency_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .and(header("Idempotency-Key", "order-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pi_42",
                "client_secret": "pi_42_secret",
                "amount": 500,
                "currency": "eur"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = PaymentIntentRequest::new(500, "eur").with_idempotency_key("order-42");
        let intent = strategy_for(&server)
            .create_payment_intent(&request)
            .await
            .unwrap();

        assert_eq!(intent.currency, "eur");
    }

    #[tokio::test]
    async fn test_stripe_error_message_surfaces() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "type": "invalid_request_error",
                    "message": "Invalid currency: xyz"
                }
            })))
            .mount(&server)
            .await;

        let err = strategy_for(&server)
            .create_payment_intent(&PaymentIntentRequest::new(1999, "xyz"))
            .await
            .unwrap_err();

        match err {
            IdentityError::ProviderError { provider, message } => {
                assert_eq!(provider, "stripe");
                assert_eq!(message, "Invalid currency: xyz");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = strategy_for(&server)
            .create_payment_intent(&PaymentIntentRequest::new(1999, "usd"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("upstream down"));
    }

    #[tokio::test]
    async fn test_rejects_non_positive_amount() {
        let server = MockServer::start().await;
        let err = strategy_for(&server)
            .create_payment_intent(&PaymentIntentRequest::new(0, "usd"))
            .await
            .unwrap_err();

        assert!(matches!(err, IdentityError::InvalidRequest(_)));
    }
}
