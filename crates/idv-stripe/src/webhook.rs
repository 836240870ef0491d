//! # Stripe Identity Webhook Handling
//!
//! Dispatch for verified Stripe Identity events.
//! Verification session events are routed by [`EventKind`], and failed checks
//! are routed again by [`FailureCode`].

use idv_core::{
    EventKind, FailureCode, IdentityError, IdentityResult, LastError, VerificationEvent,
    VerificationSession,
};
use tracing::{debug, info, warn};

/// Which branch a dispatched event took
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// All verification checks passed
    Verified { session_id: Option<String> },
    /// A check failed with the given code and reason
    RequiresInput {
        session_id: Option<String>,
        code: FailureCode,
        reason: String,
    },
    /// Event type has no handler
    Ignored { event_type: String },
}

/// Verification event handler trait
///
/// Implement this trait to act on verification outcomes. Every method has a
/// logging default so implementors only override the branches they care about.
#[allow(unused_variables)]
pub trait VerificationHandler: Send + Sync {
    /// Called when all verification checks passed
    fn on_verified(&self, event: &VerificationEvent) -> IdentityResult<()> {
        info!(
            "All the verification checks passed: session={:?}",
            event.object.get("id").and_then(|v| v.as_str())
        );
        Ok(())
    }

    /// Called when the document was invalid
    fn on_document_unverified(
        &self,
        session: &VerificationSession,
        error: &LastError,
    ) -> IdentityResult<()> {
        info!("The document was invalid: session={:?}", session.id);
        Ok(())
    }

    /// Called when the document was expired
    fn on_document_expired(
        &self,
        session: &VerificationSession,
        error: &LastError,
    ) -> IdentityResult<()> {
        info!("The document was expired: session={:?}", session.id);
        Ok(())
    }

    /// Called when the document type is not supported
    fn on_document_type_not_supported(
        &self,
        session: &VerificationSession,
        error: &LastError,
    ) -> IdentityResult<()> {
        info!("The document type was not supported: session={:?}", session.id);
        Ok(())
    }

    /// Called for failure codes without a dedicated branch
    fn on_other_failure(
        &self,
        session: &VerificationSession,
        error: &LastError,
    ) -> IdentityResult<()> {
        info!(
            "Other verification error code: code={}, session={:?}",
            error.code, session.id
        );
        Ok(())
    }

    /// Called for unknown/unhandled events
    fn on_unknown_event(&self, event: &VerificationEvent) -> IdentityResult<()> {
        debug!("Unhandled webhook event: {}", event.event_type);
        Ok(())
    }
}

/// Default no-op handler (just logs events)
pub struct LoggingVerificationHandler;

impl VerificationHandler for LoggingVerificationHandler {}

/// Dispatch a verification event to the appropriate handler method
pub fn dispatch_verification_event(
    handler: &dyn VerificationHandler,
    event: &VerificationEvent,
) -> IdentityResult<DispatchOutcome> {
    match &event.event_type {
        EventKind::Verified => {
            handler.on_verified(event)?;
            Ok(DispatchOutcome::Verified {
                session_id: object_id(event),
            })
        }
        EventKind::RequiresInput => {
            let session = event.session()?;
            let error = session.last_error.clone().ok_or_else(|| {
                IdentityError::MalformedEvent(
                    "requires_input event without last_error".to_string(),
                )
            })?;

            warn!(
                code = %error.code,
                "Verification check failed: {}", error.reason
            );

            match &error.code {
                FailureCode::DocumentUnverifiedOther => {
                    handler.on_document_unverified(&session, &error)?
                }
                FailureCode::DocumentExpired => handler.on_document_expired(&session, &error)?,
                FailureCode::DocumentTypeNotSupported => {
                    handler.on_document_type_not_supported(&session, &error)?
                }
                FailureCode::Other(_) => handler.on_other_failure(&session, &error)?,
            }

            Ok(DispatchOutcome::RequiresInput {
                session_id: session.id,
                code: error.code,
                reason: error.reason,
            })
        }
        EventKind::Other(event_type) => {
            handler.on_unknown_event(event)?;
            Ok(DispatchOutcome::Ignored {
                event_type: event_type.clone(),
            })
        }
    }
}

fn object_id(event: &VerificationEvent) -> Option<String> {
    event
        .object
        .get("id")
        .and_then(|v| v.as_str())
        .map(String::from)
}

/// Events that should be enabled in Stripe Dashboard
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &[
    "identity.verification_session.verified",
    "identity.verification_session.requires_input",
];
