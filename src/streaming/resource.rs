//! Ranged streaming of file-store resources.
//!
//! The handler only ever sees a token: it verifies it, looks the file up,
//! resolves the client's `Range` header against the known size, and streams
//! the window back from the store. HEAD requests go through the same path;
//! axum drops the body for us.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, Response, StatusCode},
};
use relaycast_common::Error;
use relaycast_token::TokenPayload;

use crate::server::{ApiError, AppContext};

use super::range::resolve_range;

/// `GET /stream/{token}.mp4`
pub async fn stream_resource(
    State(ctx): State<AppContext>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> Result<Response<Body>, ApiError> {
    // The extension suffix exists for player compatibility only.
    let token = token.split('.').next().unwrap_or(&token);

    let (file_id, quality) = match ctx.codec.verify(token)? {
        TokenPayload::Resource { file_id, quality } => (file_id, quality),
        TokenPayload::Proxy { .. } => return Err(Error::InvalidToken.into()),
    };

    let meta = ctx.file_metadata(&file_id).await?;

    let range_header = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok());
    let range = resolve_range(range_header, meta.size)?;

    tracing::debug!(
        %file_id,
        %quality,
        start = range.start,
        end = range.end,
        partial = range.is_partial,
        "streaming resource"
    );

    let store = ctx.store()?;
    let stream = store.read_range(&file_id, range.start, range.end).await?;

    let status = if range.is_partial {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, meta.mime_type.as_str())
        .header(header::CONTENT_LENGTH, range.length())
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CACHE_CONTROL, "no-cache");

    if range.is_partial {
        builder = builder.header(header::CONTENT_RANGE, range.content_range());
    }

    builder
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError(Error::internal(format!("response build failed: {e}"))))
}
