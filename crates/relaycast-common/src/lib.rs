//! Relaycast-Common: Shared types and error handling.
//!
//! This crate provides common functionality used across relaycast:
//!
//! - **Core Types**: Enums for playback quality levels and media kinds,
//!   plus the proxy options bag carried inside proxy tokens
//! - **Error Handling**: The unified error taxonomy and result alias
//!
//! # Examples
//!
//! ```
//! use relaycast_common::{Error, MediaKind, QualityLevel, Result};
//!
//! // Parse lenient quality selectors (unknown values fall back to original)
//! assert_eq!(QualityLevel::parse("720p"), QualityLevel::Q720);
//! assert_eq!(QualityLevel::parse("potato"), QualityLevel::Original);
//!
//! // Detect a media kind from a source URL
//! let kind = MediaKind::from_url("https://cdn.example.com/live/index.m3u8");
//! assert_eq!(kind, MediaKind::Hls);
//!
//! // Use the common error type
//! fn example() -> Result<()> {
//!     Err(Error::not_found("file"))
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
