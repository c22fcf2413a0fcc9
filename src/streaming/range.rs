//! HTTP `Range` header resolution.
//!
//! Turns an optional client `Range` header plus the known total size into a
//! concrete inclusive byte window, or a 416 when the request is outside the
//! resource. Malformed headers are ignored (full response), matching how
//! browsers expect lenient servers to behave; only syntactically valid but
//! unsatisfiable ranges are rejected.

use relaycast_common::{Error, Result};

/// A resolved byte window over a resource of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    /// First byte offset, inclusive.
    pub start: u64,
    /// Last byte offset, inclusive.
    pub end: u64,
    /// Total size of the underlying resource.
    pub total_size: u64,
    /// Whether this is a partial window (serve 206 with Content-Range).
    pub is_partial: bool,
}

impl ResolvedRange {
    fn full(total_size: u64) -> Self {
        Self {
            start: 0,
            end: total_size.saturating_sub(1),
            total_size,
            is_partial: false,
        }
    }

    /// Number of bytes in the window.
    pub fn length(&self) -> u64 {
        if self.total_size == 0 {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// `Content-Range` header value for a partial response.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }
}

/// Resolve a client `Range` header against a resource of `total_size` bytes.
///
/// `None` or a header we cannot parse yields the full resource. A parseable
/// range that starts at or past the end of the resource is an error. When the
/// header carries several ranges, only the first is honored.
pub fn resolve_range(header: Option<&str>, total_size: u64) -> Result<ResolvedRange> {
    let Some(header) = header else {
        return Ok(ResolvedRange::full(total_size));
    };

    let Some((start, end)) = parse_range_header(header) else {
        tracing::debug!("ignoring unparseable Range header: {header:?}");
        return Ok(ResolvedRange::full(total_size));
    };

    if total_size == 0 {
        return Err(Error::range("cannot satisfy a range of an empty resource"));
    }

    let (start, end) = match (start, end) {
        // bytes=a-b
        (Some(start), Some(end)) => (start, end.min(total_size - 1)),
        // bytes=a-
        (Some(start), None) => (start, total_size - 1),
        // bytes=-n, the last n bytes
        (None, Some(suffix)) => {
            if suffix == 0 {
                return Err(Error::range("zero-length suffix range"));
            }
            (total_size.saturating_sub(suffix), total_size - 1)
        }
        (None, None) => return Ok(ResolvedRange::full(total_size)),
    };

    if start >= total_size {
        return Err(Error::range(format!(
            "range start {start} beyond resource size {total_size}"
        )));
    }
    if start > end {
        return Err(Error::range(format!("range start {start} after end {end}")));
    }

    Ok(ResolvedRange {
        start,
        end,
        total_size,
        is_partial: true,
    })
}

/// Parse `bytes=a-b`, `bytes=a-` or `bytes=-n`. Returns `None` when the
/// header does not fit that shape; multiple range-sets keep only the first.
fn parse_range_header(header: &str) -> Option<(Option<u64>, Option<u64>)> {
    let spec = header.trim().strip_prefix("bytes=")?;
    let first = spec.split(',').next()?.trim();

    let (start_str, end_str) = first.split_once('-')?;
    let start = match start_str.trim() {
        "" => None,
        s => Some(s.parse().ok()?),
    };
    let end = match end_str.trim() {
        "" => None,
        s => Some(s.parse().ok()?),
    };

    if start.is_none() && end.is_none() {
        return None;
    }
    Some((start, end))
}
