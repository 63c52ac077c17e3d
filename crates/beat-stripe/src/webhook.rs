//! # Stripe Webhook Verification
//!
//! Signature verification and event parsing for inbound Stripe webhooks.
//! Stripe signs each delivery with HMAC-SHA256 over `"{timestamp}.{body}"`
//! using the endpoint's signing secret; a forged or replayed delivery must
//! never reach fulfillment.

use beat_core::{CheckoutCompleted, StoreError, StoreResult, WebhookEvent, WebhookEventKind};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

/// Maximum age of a signed timestamp before the delivery is rejected
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Verify a `Stripe-Signature` header against the payload and parse the event.
pub fn verify_and_parse(
    webhook_secret: &str,
    payload: &[u8],
    signature: &str,
) -> StoreResult<WebhookEvent> {
    let header = parse_signature_header(signature)?;

    let now = Utc::now().timestamp();
    if (now - header.timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(StoreError::WebhookVerification(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    let expected = compute_signature(webhook_secret, header.timestamp, payload);
    let valid = header
        .signatures
        .iter()
        .any(|sig| constant_time_eq(sig, &expected));

    if !valid {
        return Err(StoreError::WebhookVerification(
            "Signature mismatch".to_string(),
        ));
    }

    parse_event(payload)
}

/// Build a `Stripe-Signature` header value for a payload.
///
/// Counterpart of the verification above; used when simulating deliveries
/// against a locally running endpoint.
pub fn signature_header(webhook_secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!(
        "t={},v1={}",
        timestamp,
        compute_signature(webhook_secret, timestamp, payload)
    )
}

/// Parse a verified payload into a typed event.
fn parse_event(payload: &[u8]) -> StoreResult<WebhookEvent> {
    let event: StripeEvent = serde_json::from_slice(payload)
        .map_err(|e| StoreError::WebhookParse(format!("Failed to parse webhook: {}", e)))?;

    debug!("Verified Stripe webhook: type={}", event.event_type);

    let kind = match event.event_type.as_str() {
        "checkout.session.completed" => {
            WebhookEventKind::CheckoutCompleted(parse_completed_session(&event.data.object)?)
        }
        other => WebhookEventKind::Other(other.to_string()),
    };

    Ok(WebhookEvent {
        event_id: event.id,
        kind,
        created: DateTime::from_timestamp(event.created, 0).unwrap_or_else(Utc::now),
    })
}

/// Extract the fields fulfillment needs from a completed session object.
fn parse_completed_session(
    object: &serde_json::Map<String, serde_json::Value>,
) -> StoreResult<CheckoutCompleted> {
    let session_id = object
        .get("id")
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| StoreError::WebhookParse("Missing session id".to_string()))?;

    let payment_status = object
        .get("payment_status")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    // Prefer the email supplied at session creation, fall back to the one
    // the buyer entered on the hosted payment page.
    let customer_email = object
        .get("customer_email")
        .and_then(|v| v.as_str())
        .or_else(|| {
            object
                .get("customer_details")
                .and_then(|cd| cd.get("email"))
                .and_then(|v| v.as_str())
        })
        .map(String::from);

    let metadata = object
        .get("metadata")
        .and_then(|m| m.as_object())
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();

    Ok(CheckoutCompleted {
        session_id,
        payment_status,
        customer_email,
        metadata,
    })
}

// =============================================================================
// Stripe event envelope
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    created: i64,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

// =============================================================================
// Signature primitives
// =============================================================================

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> StoreResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let kv: Vec<&str> = part.split('=').collect();
        if kv.len() != 2 {
            continue;
        }
        match kv[0] {
            "t" => {
                timestamp = kv[1].parse().ok();
            }
            "v1" => {
                signatures.push(kv[1].to_string());
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        StoreError::WebhookVerification("Missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(StoreError::WebhookVerification(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "whsec_test_secret";

    fn completed_payload() -> Vec<u8> {
        json!({
            "id": "evt_test_1",
            "type": "checkout.session.completed",
            "created": Utc::now().timestamp(),
            "data": {
                "object": {
                    "id": "cs_test_123",
                    "payment_status": "paid",
                    "customer_email": "buyer@example.com",
                    "metadata": {
                        "productId": "beat1",
                        "displayName": "GN1",
                        "hasStems": "true"
                    }
                }
            }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_parse_signature_header() {
        let header = parse_signature_header("t=1234567890,v1=abc123,v1=def456").unwrap();
        assert_eq!(header.timestamp, 1234567890);
        assert_eq!(header.signatures.len(), 2);
        assert_eq!(header.signatures[0], "abc123");
    }

    #[test]
    fn test_parse_signature_header_missing_parts() {
        assert!(parse_signature_header("v1=abc123").is_err());
        assert!(parse_signature_header("t=1234567890").is_err());
    }

    #[test]
    fn test_compute_signature_is_hex_sha256() {
        let sig = compute_signature(SECRET, 1234567890, b"{}");
        assert_eq!(sig.len(), 64);
        assert!(sig.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abc123", "abc123"));
        assert!(!constant_time_eq("abc123", "abc124"));
        assert!(!constant_time_eq("abc", "abcd"));
    }

    #[test]
    fn test_verify_and_parse_round_trip() {
        let payload = completed_payload();
        let header = signature_header(SECRET, Utc::now().timestamp(), &payload);

        let event = verify_and_parse(SECRET, &payload, &header).unwrap();
        assert_eq!(event.event_id, "evt_test_1");

        match event.kind {
            WebhookEventKind::CheckoutCompleted(completed) => {
                assert_eq!(completed.session_id, "cs_test_123");
                assert_eq!(completed.customer_email.as_deref(), Some("buyer@example.com"));
                assert_eq!(completed.beat_id(), Some("beat1"));
                assert_eq!(completed.beat_name(), Some("GN1"));
                assert!(completed.has_stems());
            }
            other => panic!("unexpected event kind: {:?}", other),
        }
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let payload = completed_payload();
        let header = signature_header("whsec_other_secret", Utc::now().timestamp(), &payload);

        let err = verify_and_parse(SECRET, &payload, &header).unwrap_err();
        assert!(matches!(err, StoreError::WebhookVerification(_)));
    }

    #[test]
    fn test_verify_rejects_tampered_payload() {
        let payload = completed_payload();
        let header = signature_header(SECRET, Utc::now().timestamp(), &payload);

        let mut tampered = payload.clone();
        tampered[0] ^= 1;
        assert!(verify_and_parse(SECRET, &tampered, &header).is_err());
    }

    #[test]
    fn test_verify_rejects_stale_timestamp() {
        let payload = completed_payload();
        let stale = Utc::now().timestamp() - SIGNATURE_TOLERANCE_SECS - 60;
        let header = signature_header(SECRET, stale, &payload);

        let err = verify_and_parse(SECRET, &payload, &header).unwrap_err();
        assert!(matches!(err, StoreError::WebhookVerification(_)));
    }

    #[test]
    fn test_customer_details_email_fallback() {
        let payload = json!({
            "id": "evt_test_2",
            "type": "checkout.session.completed",
            "created": Utc::now().timestamp(),
            "data": {
                "object": {
                    "id": "cs_test_456",
                    "payment_status": "paid",
                    "customer_email": null,
                    "customer_details": { "email": "entered@example.com" },
                    "metadata": { "productId": "beat1" }
                }
            }
        })
        .to_string()
        .into_bytes();
        let header = signature_header(SECRET, Utc::now().timestamp(), &payload);

        let event = verify_and_parse(SECRET, &payload, &header).unwrap();
        match event.kind {
            WebhookEventKind::CheckoutCompleted(completed) => {
                assert_eq!(
                    completed.customer_email.as_deref(),
                    Some("entered@example.com")
                );
            }
            other => panic!("unexpected event kind: {:?}", other),
        }
    }

    #[test]
    fn test_other_event_types_pass_through() {
        let payload = json!({
            "id": "evt_test_3",
            "type": "charge.refunded",
            "created": Utc::now().timestamp(),
            "data": { "object": { "id": "ch_test_789" } }
        })
        .to_string()
        .into_bytes();
        let header = signature_header(SECRET, Utc::now().timestamp(), &payload);

        let event = verify_and_parse(SECRET, &payload, &header).unwrap();
        assert!(matches!(event.kind, WebhookEventKind::Other(ref t) if t == "charge.refunded"));
    }
}
