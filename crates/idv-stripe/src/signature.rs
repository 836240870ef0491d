//! # Webhook Signature Verification
//!
//! Two [`Verifier`] strategies for Stripe webhook bodies:
//!
//! - [`SignedVerifier`] checks the `Stripe-Signature` header
//!   (`t=<unix>,v1=<hex>[,v1=<hex>...]`) against
//!   HMAC-SHA256(secret, `"<t>.<raw body>"`).
//! - [`TrustingVerifier`] skips the check and parses the body as-is.
//!   Local development only.
//!
//! The body is hashed exactly as received. It is never decoded, trimmed or
//! re-serialized before the MAC is computed.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use idv_core::{BoxedVerifier, EventKind, IdentityError, IdentityResult, VerificationEvent, Verifier};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the Stripe signature
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum age of a signed timestamp, in seconds
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Verifies Stripe webhook signatures with a shared signing secret.
pub struct SignedVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl SignedVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Builder: override the timestamp tolerance
    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    fn verify_at(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: DateTime<Utc>,
    ) -> IdentityResult<VerificationEvent> {
        let header = signature.ok_or_else(|| {
            IdentityError::SignatureVerification("Missing Stripe-Signature header".to_string())
        })?;

        let sig_parts = parse_signature_header(header)?;
        let mac = signed_mac(&self.secret, sig_parts.timestamp, payload)?;

        let valid = sig_parts.signatures.iter().any(|candidate| {
            hex::decode(candidate)
                .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
                .unwrap_or(false)
        });

        if !valid {
            return Err(IdentityError::SignatureVerification(
                "Signature mismatch".to_string(),
            ));
        }

        if now.timestamp().abs_diff(sig_parts.timestamp) > self.tolerance_secs.unsigned_abs() {
            return Err(IdentityError::SignatureVerification(
                "Timestamp outside tolerance".to_string(),
            ));
        }

        let event = parse_event(payload)?;
        debug!("Verified Stripe webhook: type={}", event.event_type);
        Ok(event)
    }
}

impl Verifier for SignedVerifier {
    fn verify(&self, payload: &[u8], signature: Option<&str>) -> IdentityResult<VerificationEvent> {
        self.verify_at(payload, signature, Utc::now())
    }

    fn is_signed(&self) -> bool {
        true
    }
}

/// Accepts every well-formed body without checking its signature.
///
/// **WARNING:** anyone who can reach the webhook endpoint can forge events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustingVerifier;

impl Verifier for TrustingVerifier {
    fn verify(&self, payload: &[u8], _signature: Option<&str>) -> IdentityResult<VerificationEvent> {
        warn!("Webhook accepted without signature verification");
        parse_event(payload)
    }

    fn is_signed(&self) -> bool {
        false
    }
}

/// Pick the verifier for this process.
///
/// A signing secret always wins. Without one, unsigned webhooks are only
/// accepted when `allow_unsigned` is set.
pub fn select_verifier(
    webhook_secret: Option<&str>,
    allow_unsigned: bool,
    tolerance_secs: i64,
) -> IdentityResult<BoxedVerifier> {
    match webhook_secret {
        Some(secret) => Ok(Arc::new(
            SignedVerifier::new(secret).with_tolerance(tolerance_secs),
        )),
        None if allow_unsigned => {
            warn!("STRIPE_WEBHOOK_SECRET not set: webhook signatures will NOT be verified");
            Ok(Arc::new(TrustingVerifier))
        }
        None => Err(IdentityError::Configuration(
            "STRIPE_WEBHOOK_SECRET not set (set ALLOW_UNSIGNED_WEBHOOKS=true to accept unsigned webhooks)"
                .to_string(),
        )),
    }
}

/// Build a `Stripe-Signature` header value for `payload`.
///
/// Mirrors what Stripe sends.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> IdentityResult<String> {
    let mac = signed_mac(secret, timestamp, payload)?;
    Ok(format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    ))
}

// =============================================================================
// Stripe Event Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    created: Option<i64>,
    #[serde(default)]
    livemode: bool,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Value,
}

/// Parse a webhook body into an event. Requires `type` and `data.object`.
fn parse_event(payload: &[u8]) -> IdentityResult<VerificationEvent> {
    let event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
        IdentityError::MalformedEvent(format!("Failed to parse webhook: {}", e))
    })?;

    Ok(VerificationEvent {
        event_id: event.id,
        event_type: EventKind::parse(&event.event_type),
        livemode: event.livemode,
        object: event.data.object,
        created: event
            .created
            .and_then(|ts| DateTime::from_timestamp(ts, 0)),
    })
}

// =============================================================================
// Signature Header
// =============================================================================

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> IdentityResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key.trim() {
            "t" => timestamp = value.trim().parse().ok(),
            "v1" => signatures.push(value.trim().to_string()),
            _ => {} // v0 and future schemes
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        IdentityError::SignatureVerification("Missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(IdentityError::SignatureVerification(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn signed_mac(secret: &str, timestamp: i64, payload: &[u8]) -> IdentityResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| IdentityError::Internal(format!("HMAC key error: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const EXPIRED_PAYLOAD: &str = r#"{"type":"identity.verification_session.requires_input","data":{"object":{"last_error":{"reason":"Document was expired","code":"document_expired"}}}}"#;

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    #[test]
    fn test_parse_signature_header() {
        let header = "t=1234567890,v1=abc123,v1=def456,v0=old";
        let parsed = parse_signature_header(header).unwrap();

        assert_eq!(parsed.timestamp, 1234567890);
        assert_eq!(parsed.signatures, vec!["abc123", "def456"]);
    }

    #[test]
    fn test_parse_signature_header_invalid() {
        assert!(parse_signature_header("invalid").is_err());
        assert!(parse_signature_header("v1=abc").is_err());
        assert!(parse_signature_header("t=123").is_err());
    }

    #[test]
    fn test_verify_valid_signature() {
        let ts = now();
        let header = signature_header(SECRET, ts, EXPIRED_PAYLOAD.as_bytes()).unwrap();

        let event = SignedVerifier::new(SECRET)
            .verify(EXPIRED_PAYLOAD.as_bytes(), Some(&header))
            .unwrap();

        assert_eq!(event.event_type, EventKind::RequiresInput);
        assert!(event.object.get("last_error").is_some());
    }

    #[test]
    fn test_trailing_whitespace_breaks_signature() {
        let ts = now();
        let header = signature_header(SECRET, ts, EXPIRED_PAYLOAD.as_bytes()).unwrap();
        let tampered = format!("{} ", EXPIRED_PAYLOAD);

        let result = SignedVerifier::new(SECRET).verify(tampered.as_bytes(), Some(&header));
        assert!(matches!(
            result,
            Err(IdentityError::SignatureVerification(_))
        ));
    }

    #[test]
    fn test_single_byte_change_breaks_signature() {
        let ts = now();
        let header = signature_header(SECRET, ts, EXPIRED_PAYLOAD.as_bytes()).unwrap();
        let tampered = EXPIRED_PAYLOAD.replace("expired\"}", "expirad\"}");

        let result = SignedVerifier::new(SECRET).verify(tampered.as_bytes(), Some(&header));
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let header = signature_header("whsec_other", now(), EXPIRED_PAYLOAD.as_bytes()).unwrap();
        let result = SignedVerifier::new(SECRET).verify(EXPIRED_PAYLOAD.as_bytes(), Some(&header));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_header_rejected() {
        let result = SignedVerifier::new(SECRET).verify(EXPIRED_PAYLOAD.as_bytes(), None);
        assert!(matches!(
            result,
            Err(IdentityError::SignatureVerification(_))
        ));
    }

    #[test]
    fn test_non_hex_signature_rejected() {
        let header = format!("t={},v1=not-hex-at-all", now());
        let result = SignedVerifier::new(SECRET).verify(EXPIRED_PAYLOAD.as_bytes(), Some(&header));
        assert!(result.is_err());
    }

    #[test]
    fn test_any_matching_candidate_accepted() {
        let ts = now();
        let good = signature_header(SECRET, ts, EXPIRED_PAYLOAD.as_bytes()).unwrap();
        let good_sig = good.split("v1=").nth(1).unwrap();
        let header = format!("t={},v1={},v1={}", ts, "00".repeat(32), good_sig);

        let result = SignedVerifier::new(SECRET).verify(EXPIRED_PAYLOAD.as_bytes(), Some(&header));
        assert!(result.is_ok());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let ts = now() - DEFAULT_TOLERANCE_SECS - 60;
        let header = signature_header(SECRET, ts, EXPIRED_PAYLOAD.as_bytes()).unwrap();

        let result = SignedVerifier::new(SECRET).verify(EXPIRED_PAYLOAD.as_bytes(), Some(&header));
        assert!(matches!(
            result,
            Err(IdentityError::SignatureVerification(_))
        ));
    }

    #[test]
    fn test_extreme_timestamps_rejected() {
        for ts in [i64::MIN, i64::MAX] {
            let header = signature_header(SECRET, ts, b"{}").unwrap();
            let result = SignedVerifier::new(SECRET).verify(b"{}", Some(&header));
            assert!(matches!(
                result,
                Err(IdentityError::SignatureVerification(_))
            ));
        }
    }

    #[test]
    fn test_verify_at_fixed_clock() {
        let ts = 1_700_000_000;
        let header = signature_header(SECRET, ts, EXPIRED_PAYLOAD.as_bytes()).unwrap();
        let verifier = SignedVerifier::new(SECRET).with_tolerance(10);

        let inside = DateTime::from_timestamp(ts + 10, 0).unwrap();
        let outside = DateTime::from_timestamp(ts + 11, 0).unwrap();

        assert!(verifier
            .verify_at(EXPIRED_PAYLOAD.as_bytes(), Some(&header), inside)
            .is_ok());
        assert!(verifier
            .verify_at(EXPIRED_PAYLOAD.as_bytes(), Some(&header), outside)
            .is_err());
    }

    #[test]
    fn test_signed_but_malformed_body() {
        let payload = br#"{"data":{"object":{}}}"#;
        let header = signature_header(SECRET, now(), payload).unwrap();

        let result = SignedVerifier::new(SECRET).verify(payload, Some(&header));
        assert!(matches!(result, Err(IdentityError::MalformedEvent(_))));
    }

    #[test]
    fn test_trusting_verifier_ignores_signature() {
        let event = TrustingVerifier
            .verify(EXPIRED_PAYLOAD.as_bytes(), Some("t=1,v1=deadbeef"))
            .unwrap();
        assert_eq!(event.event_type, EventKind::RequiresInput);
        assert!(!TrustingVerifier.is_signed());
    }

    #[test]
    fn test_trusting_verifier_rejects_missing_fields() {
        assert!(matches!(
            TrustingVerifier.verify(br#"{"type":"unknown.event"}"#, None),
            Err(IdentityError::MalformedEvent(_))
        ));
        assert!(TrustingVerifier.verify(b"not json", None).is_err());
    }

    #[test]
    fn test_parse_event_fields() {
        let payload = br#"{"id":"evt_1","type":"unknown.event","created":1700000000,"livemode":true,"data":{"object":{"id":"obj_1"}}}"#;
        let event = parse_event(payload).unwrap();

        assert_eq!(event.event_id.as_deref(), Some("evt_1"));
        assert_eq!(event.event_type, EventKind::Other("unknown.event".to_string()));
        assert!(event.livemode);
        assert_eq!(event.created.map(|c| c.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn test_select_verifier() {
        assert!(select_verifier(Some(SECRET), false, 300).unwrap().is_signed());
        assert!(!select_verifier(None, true, 300).unwrap().is_signed());
        assert!(matches!(
            select_verifier(None, false, 300),
            Err(IdentityError::Configuration(_))
        ));
    }
}
