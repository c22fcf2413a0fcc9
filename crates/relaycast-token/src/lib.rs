//! Relaycast-Token: stateless capability token codec.
//!
//! A capability token grants its bearer permission to stream exactly one
//! resource with one option set, for a bounded time, with no server-side
//! session. Everything needed to verify a token is in the token itself plus
//! the shared signing secret: decoding never consults a registry, and expiry
//! is enforced purely by recomputation.
//!
//! Two token kinds exist, modeled as one tagged sum type:
//!
//! - **Resource tokens** wrap an internal file-store ID plus a quality
//!   selector.
//! - **Proxy tokens** wrap a full external URL plus an options bag (media
//!   kind, buffering/proxy flags).
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use relaycast_common::QualityLevel;
//! use relaycast_token::{TokenCodec, TokenPayload};
//!
//! let codec = TokenCodec::new("shared-secret", Duration::from_secs(24 * 3600));
//! let token = codec.issue(&TokenPayload::Resource {
//!     file_id: "abc123".into(),
//!     quality: QualityLevel::Q720,
//! });
//! let payload = codec.verify(&token).unwrap();
//! assert!(matches!(payload, TokenPayload::Resource { .. }));
//! ```

mod codec;

pub use codec::{TokenCodec, TokenError, TokenPayload, SIGNATURE_LEN};
