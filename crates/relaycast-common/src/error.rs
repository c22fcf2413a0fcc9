//! Common error types used throughout relaycast.
//!
//! This module provides a unified error type covering the failure taxonomy
//! shared by all components: bad input, missing resources, token rejection,
//! unsatisfiable ranges, and upstream transport failures. The HTTP layer maps
//! each variant to exactly one status code; nothing propagates to a client as
//! an unstructured 500.

/// Common error type for relaycast.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input was provided (malformed source reference, bad field).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The requested resource was not found, or is not a video.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A capability token failed verification. Deliberately carries no
    /// detail about which check failed.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The requested byte range cannot be satisfied.
    #[error("Range not satisfiable: {0}")]
    RangeNotSatisfiable(String),

    /// The upstream origin refused, failed, or answered with a non-success
    /// status before any bytes were sent to the client.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream origin did not answer within the configured timeout.
    #[error("Upstream timed out: {0}")]
    UpstreamTimeout(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new RangeNotSatisfiable error.
    pub fn range<S: Into<String>>(msg: S) -> Self {
        Self::RangeNotSatisfiable(msg.into())
    }

    /// Create a new UpstreamUnavailable error.
    pub fn upstream<S: Into<String>>(msg: S) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    /// Create a new UpstreamTimeout error.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::UpstreamTimeout(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_input("bad url");
        assert_eq!(err.to_string(), "Invalid input: bad url");

        let err = Error::not_found("file abc");
        assert_eq!(err.to_string(), "Not found: file abc");

        let err = Error::range("start beyond size");
        assert_eq!(err.to_string(), "Range not satisfiable: start beyond size");

        let err = Error::upstream("connection refused");
        assert_eq!(err.to_string(), "Upstream unavailable: connection refused");

        let err = Error::timeout("origin");
        assert_eq!(err.to_string(), "Upstream timed out: origin");
    }

    #[test]
    fn test_token_error_is_opaque() {
        // The token variant must not leak which check failed.
        assert_eq!(Error::InvalidToken.to_string(), "invalid or expired token");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_result_type() {
        fn ok_fn() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(ok_fn().unwrap(), 42);

        fn error_fn() -> Result<i32> {
            Err(Error::InvalidToken)
        }
        assert!(error_fn().is_err());
    }
}
