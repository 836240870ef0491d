//! # Request Handlers
//!
//! Axum request handlers for the identity verification API.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use idv_core::{IdentityError, PaymentIntentRequest, DEFAULT_CURRENCY};
use idv_stripe::{dispatch_verification_event, SIGNATURE_HEADER};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Publishable key response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub publishable_key: String,
}

/// Create payment intent request
#[derive(Debug, Default, Deserialize)]
pub struct CreatePaymentIntentRequest {
    /// Currency code (optional, defaults to "usd")
    #[serde(default)]
    pub currency: Option<String>,
}

/// Create payment intent response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
}

/// Error body for the payment intent endpoint: `{"error":{"message":...}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentErrorBody {
    pub error: PaymentErrorMessage,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentErrorMessage {
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

fn identity_error_to_response(err: IdentityError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

fn payment_error(message: impl Into<String>) -> (StatusCode, Json<PaymentErrorBody>) {
    (
        StatusCode::BAD_REQUEST,
        Json(PaymentErrorBody {
            error: PaymentErrorMessage {
                message: message.into(),
            },
        }),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "identity-redirect",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Publishable key for the browser client
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        publishable_key: state.publishable_key.clone(),
    })
}

/// Create a payment intent and return its client secret
#[instrument(skip(state, payload))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    payload: Result<Json<CreatePaymentIntentRequest>, JsonRejection>,
) -> Result<Json<CreatePaymentIntentResponse>, (StatusCode, Json<PaymentErrorBody>)> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Invalid payment intent request: {}", rejection.body_text());
        payment_error(rejection.body_text())
    })?;

    let currency = request
        .currency
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    let intent_request = PaymentIntentRequest::new(state.config.payment_amount, currency);

    let intent = state
        .payments
        .create_payment_intent(&intent_request)
        .await
        .map_err(|e| {
            error!(
                "Failed to create payment intent via {}: {}",
                state.payments.provider_name(),
                e
            );
            let message = match e {
                IdentityError::ProviderError { message, .. } => message,
                other => other.to_string(),
            };
            payment_error(message)
        })?;

    info!(
        "Created payment intent: id={}, provider={}",
        intent.id,
        state.payments.provider_name()
    );

    Ok(Json(CreatePaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Handle Stripe Identity webhook
#[instrument(skip(state, headers, body), fields(bytes = body.len()))]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let event = state.verifier.verify(&body, signature).map_err(|e| {
        if e.is_rejection() {
            warn!("Webhook rejected: {}", e);
        } else {
            error!("Webhook verification failed: {}", e);
        }
        identity_error_to_response(e)
    })?;

    info!(
        "Received webhook: type={}, id={:?}",
        event.event_type, event.event_id
    );

    let outcome = dispatch_verification_event(state.handler.as_ref(), &event).map_err(|e| {
        error!("Webhook handler error: {}", e);
        identity_error_to_response(e)
    })?;

    info!("Webhook dispatched: {:?}", outcome);

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400);
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
    }

    #[test]
    fn test_signature_error_conversion() {
        let err = IdentityError::SignatureVerification("Signature mismatch".to_string());
        let (status, _json) = identity_error_to_response(err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_conversion() {
        let err = IdentityError::Internal("boom".to_string());
        let (status, Json(body)) = identity_error_to_response(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, 500);
    }

    #[test]
    fn test_config_response_is_camel_case() {
        let body = serde_json::to_value(ConfigResponse {
            publishable_key: "pk_test_abc".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "publishableKey": "pk_test_abc" }));
    }
}
