//! Token wire format and verification.
//!
//! Wire layout (before transport encoding), five `|`-delimited fields:
//!
//! ```text
//! kind | ref(base64url) | option | expiry | signature
//! ```
//!
//! `kind` is `v` (resource) or `p` (proxy). The ref is base64url-encoded so
//! the delimiter stays unambiguous for arbitrary IDs and URLs. `expiry` is an
//! absolute unix-seconds boundary computed at issue time. The signature is
//! HMAC-SHA256 over the first four fields, hex-encoded and truncated to
//! [`SIGNATURE_LEN`] characters for URL compactness. The whole line is then
//! base64url-encoded (no padding) so the token is a single URL path segment.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use relaycast_common::{ProxyOptions, QualityLevel};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Length of the truncated hex signature, in characters.
pub const SIGNATURE_LEN: usize = 16;

const KIND_RESOURCE: &str = "v";
const KIND_PROXY: &str = "p";

/// Decoded token contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenPayload {
    /// Grants streaming of one file-store object at one quality.
    Resource {
        file_id: String,
        quality: QualityLevel,
    },
    /// Grants relaying of one external URL with the given options.
    Proxy { url: String, options: ProxyOptions },
}

/// Token verification failure.
///
/// Variants are distinguished for diagnostics only; every variant renders as
/// the same opaque message so callers cannot probe which check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Structural damage: bad transport encoding, wrong field count,
    /// non-numeric expiry, or an unknown kind tag.
    #[error("invalid or expired token")]
    Malformed,
    /// The signature did not match the decoded fields.
    #[error("invalid or expired token")]
    BadSignature,
    /// The expiry boundary has passed.
    #[error("invalid or expired token")]
    Expired,
}

/// Stateless encoder/verifier for capability tokens.
///
/// Cloning is cheap enough to avoid; the server holds one instance in an
/// `Arc` and hands out references. There is no cache: verification is a
/// single HMAC, and the token bytes themselves are the only source of truth.
pub struct TokenCodec {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenCodec {
    /// Create a codec from the shared signing secret and token lifetime.
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Issue a token expiring `ttl` from now.
    pub fn issue(&self, payload: &TokenPayload) -> String {
        self.issue_at(payload, unix_now())
    }

    /// Issue a token as of the given clock reading. Deterministic: identical
    /// payload, secret, and clock always produce the identical token.
    pub fn issue_at(&self, payload: &TokenPayload, now_secs: u64) -> String {
        let expiry = now_secs + self.ttl.as_secs();
        let (kind, reference, option) = match payload {
            TokenPayload::Resource { file_id, quality } => (
                KIND_RESOURCE,
                URL_SAFE_NO_PAD.encode(file_id.as_bytes()),
                quality.as_str().to_string(),
            ),
            TokenPayload::Proxy { url, options } => (
                KIND_PROXY,
                URL_SAFE_NO_PAD.encode(url.as_bytes()),
                options.encode(),
            ),
        };

        let signed = format!("{kind}|{reference}|{option}|{expiry}");
        let sig = self.sign(&signed);
        URL_SAFE_NO_PAD.encode(format!("{signed}|{sig}"))
    }

    /// Verify a token against the current clock.
    pub fn verify(&self, token: &str) -> Result<TokenPayload, TokenError> {
        self.verify_at(token, unix_now())
    }

    /// Verify a token as of the given clock reading.
    ///
    /// Checks run structure → signature → expiry, so a tampered expiry field
    /// fails as a signature mismatch rather than being trusted.
    pub fn verify_at(&self, token: &str, now_secs: u64) -> Result<TokenPayload, TokenError> {
        let decoded = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| TokenError::Malformed)?;
        let plain = String::from_utf8(decoded).map_err(|_| TokenError::Malformed)?;

        let fields: Vec<&str> = plain.split('|').collect();
        let (kind, reference, option, expiry, sig) = match fields.as_slice() {
            [k, r, o, e, s] => (*k, *r, *o, *e, *s),
            _ => return Err(TokenError::Malformed),
        };

        let expiry: u64 = expiry.parse().map_err(|_| TokenError::Malformed)?;

        let signed_len = plain.len() - sig.len() - 1;
        self.check_signature(&plain[..signed_len], sig)?;

        if now_secs > expiry {
            return Err(TokenError::Expired);
        }

        match kind {
            KIND_RESOURCE => Ok(TokenPayload::Resource {
                file_id: decode_ref(reference)?,
                quality: QualityLevel::parse(option),
            }),
            KIND_PROXY => Ok(TokenPayload::Proxy {
                url: decode_ref(reference)?,
                options: ProxyOptions::decode(option),
            }),
            _ => Err(TokenError::Malformed),
        }
    }

    fn sign(&self, data: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(data.as_bytes());
        let digest = hex::encode(mac.finalize().into_bytes());
        digest[..SIGNATURE_LEN].to_string()
    }

    /// Constant-time comparison of the truncated tag.
    fn check_signature(&self, signed: &str, sig: &str) -> Result<(), TokenError> {
        if sig.len() != SIGNATURE_LEN {
            return Err(TokenError::BadSignature);
        }
        let tag = hex::decode(sig).map_err(|_| TokenError::BadSignature)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(signed.as_bytes());
        mac.verify_truncated_left(&tag)
            .map_err(|_| TokenError::BadSignature)
    }
}

fn decode_ref(reference: &str) -> Result<String, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(reference)
        .map_err(|_| TokenError::Malformed)?;
    String::from_utf8(bytes).map_err(|_| TokenError::Malformed)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
