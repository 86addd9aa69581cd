//! LINE webhook signature verification.
//!
//! LINE signs webhook requests with HMAC-SHA256 over the raw request body,
//! base64-encoded into the `X-Line-Signature` header.
//! Reference: https://developers.line.biz/en/reference/messaging-api/#signature-validation

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Compute the expected signature for a request body.
///
/// Returns the base64-encoded HMAC-SHA256 digest of `body` keyed with
/// `channel_secret`.
pub fn compute_signature(channel_secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Verify a LINE webhook signature.
///
/// Recomputes the digest over the exact raw body bytes and compares it to
/// the candidate header value. The body must not have been parsed and
/// re-serialized before this point, or the digest will not match.
///
/// Returns `true` iff the candidate equals the computed digest exactly.
pub fn verify_line_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    if channel_secret.is_empty() || signature.is_empty() {
        warn!(
            has_secret = !channel_secret.is_empty(),
            has_signature = !signature.is_empty(),
            "line_signature_missing_fields"
        );
        return false;
    }

    let expected = compute_signature(channel_secret, body);

    // Constant-time comparison to prevent timing attacks
    let valid = constant_time_compare(&expected, signature);

    if valid {
        debug!(body_length = body.len(), "line_signature_verified");
    } else {
        warn!(
            expected_length = expected.len(),
            actual_length = signature.len(),
            "line_signature_mismatch"
        );
    }

    valid
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
