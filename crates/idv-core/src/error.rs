//! # Error Types
//!
//! Typed error handling for the identity verification server.
//! All fallible operations return `Result<T, IdentityError>`.

use thiserror::Error;

/// Core error type for webhook ingestion and provider calls
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Webhook signature verification failed
    #[error("Webhook signature verification failed: {0}")]
    SignatureVerification(String),

    /// Event payload is missing required fields or is not JSON
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            IdentityError::Configuration(_) => 500,
            IdentityError::InvalidRequest(_) => 400,
            IdentityError::ProviderError { .. } => 502,
            IdentityError::NetworkError(_) => 503,
            IdentityError::SignatureVerification(_) => 400,
            IdentityError::MalformedEvent(_) => 400,
            IdentityError::Serialization(_) => 500,
            IdentityError::Internal(_) => 500,
        }
    }

    /// True for errors that reject a webhook before dispatch
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            IdentityError::SignatureVerification(_) | IdentityError::MalformedEvent(_)
        )
    }
}

/// Result type alias for identity operations
pub type IdentityResult<T> = Result<T, IdentityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_rejections_are_bad_request() {
        let sig = IdentityError::SignatureVerification("Signature mismatch".into());
        let malformed = IdentityError::MalformedEvent("missing type".into());

        assert_eq!(sig.status_code(), 400);
        assert_eq!(malformed.status_code(), 400);
        assert!(sig.is_rejection());
        assert!(malformed.is_rejection());
        assert!(!IdentityError::Internal("x".into()).is_rejection());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(IdentityError::Configuration("x".into()).status_code(), 500);
        assert_eq!(IdentityError::NetworkError("x".into()).status_code(), 503);
        assert_eq!(
            IdentityError::ProviderError {
                provider: "stripe".into(),
                message: "x".into()
            }
            .status_code(),
            502
        );
    }
}
