//! # Verification Events
//!
//! Provider-neutral model of identity verification webhook events.
//!
//! The event `type` string and the session `last_error.code` string are both
//! mapped onto closed enums so dispatch is an exhaustive `match`.

use crate::error::{IdentityError, IdentityResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

const EVENT_TYPE_PREFIX: &str = "identity.";

/// Classification of an incoming webhook event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// All verification checks passed
    Verified,
    /// At least one verification check failed
    RequiresInput,
    /// Any other event type (passthrough, no action)
    Other(String),
}

impl EventKind {
    /// Classify a provider event type.
    ///
    /// The `identity.` namespace prefix is optional.
    pub fn parse(event_type: &str) -> Self {
        let name = event_type
            .strip_prefix(EVENT_TYPE_PREFIX)
            .unwrap_or(event_type);

        match name {
            "verification_session.verified" => EventKind::Verified,
            "verification_session.requires_input" => EventKind::RequiresInput,
            _ => EventKind::Other(event_type.to_string()),
        }
    }

    /// Full provider event type string
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Verified => "identity.verification_session.verified",
            EventKind::RequiresInput => "identity.verification_session.requires_input",
            EventKind::Other(raw) => raw,
        }
    }
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        EventKind::parse(&value)
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable reason a verification check failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FailureCode {
    /// The document was invalid
    DocumentUnverifiedOther,
    /// The document was expired
    DocumentExpired,
    /// The document type is not supported
    DocumentTypeNotSupported,
    /// Any code without a dedicated branch
    Other(String),
}

impl FailureCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "document_unverified_other" => FailureCode::DocumentUnverifiedOther,
            "document_expired" => FailureCode::DocumentExpired,
            "document_type_not_supported" => FailureCode::DocumentTypeNotSupported,
            other => FailureCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FailureCode::DocumentUnverifiedOther => "document_unverified_other",
            FailureCode::DocumentExpired => "document_expired",
            FailureCode::DocumentTypeNotSupported => "document_type_not_supported",
            FailureCode::Other(raw) => raw,
        }
    }
}

impl From<String> for FailureCode {
    fn from(value: String) -> Self {
        FailureCode::parse(&value)
    }
}

impl From<FailureCode> for String {
    fn from(code: FailureCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details of the most recent failed check on a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastError {
    /// Human-readable explanation
    pub reason: String,
    /// Machine-readable code
    pub code: FailureCode,
}

/// Verification session record carried in `data.object`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationSession {
    /// Session ID (vs_...)
    #[serde(default)]
    pub id: Option<String>,

    /// Session status as reported by the provider
    #[serde(default)]
    pub status: Option<String>,

    /// Present when a check failed
    #[serde(default)]
    pub last_error: Option<LastError>,

    /// Caller-supplied metadata
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// A verified (or trusted) webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationEvent {
    /// Event ID from provider (evt_...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    /// Event classification
    pub event_type: EventKind,

    /// Whether the event came from live mode
    #[serde(default)]
    pub livemode: bool,

    /// Raw `data.object`
    pub object: serde_json::Value,

    /// Creation time reported by the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

impl VerificationEvent {
    /// Parse `data.object` as a verification session
    pub fn session(&self) -> IdentityResult<VerificationSession> {
        if !self.object.is_object() {
            return Err(IdentityError::MalformedEvent(
                "data.object is not an object".to_string(),
            ));
        }

        serde_json::from_value(self.object.clone()).map_err(|e| {
            IdentityError::MalformedEvent(format!("Invalid verification session: {}", e))
        })
    }
}
