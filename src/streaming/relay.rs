//! Universal relay for arbitrary external media URLs.
//!
//! The wrapped origin is opaque: we do not know its size, and it may answer
//! with or without range support. So the client's `Range` header is forwarded
//! verbatim and the origin's status and range headers are mirrored back.
//! Playlists are the exception: their bodies are buffered and rewritten so
//! every entry routes back through the relay.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, Response, StatusCode},
};
use futures::TryStreamExt;
use relaycast_common::{Error, MediaKind, ProxyOptions};
use relaycast_token::TokenPayload;

use crate::server::{request_base_url, ApiError, AppContext};

use super::manifest::rewrite_playlist;

/// Sent to origins instead of a bot-looking default; some CDNs refuse
/// non-browser agents outright.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Response headers worth mirroring from the origin on passthrough.
const MIRRORED_HEADERS: [&str; 3] = ["content-length", "content-range", "accept-ranges"];

/// `GET /universal/stream/{token}` (an optional extension suffix is ignored).
pub async fn universal_stream(
    State(ctx): State<AppContext>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> Result<Response<Body>, ApiError> {
    let token = token.split('.').next().unwrap_or(&token);

    let (url, options) = match ctx.codec.verify(token)? {
        TokenPayload::Proxy { url, options } => (url, options),
        TokenPayload::Resource { .. } => return Err(Error::InvalidToken.into()),
    };

    // reqwest still speaks http 0.x, so headers cross the boundary as bytes.
    let mut request = ctx
        .http
        .get(&url)
        .header("user-agent", USER_AGENT)
        .header("accept", "*/*");
    if let Some(range) = headers.get(header::RANGE) {
        request = request.header("range", range.as_bytes());
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            Error::timeout(format!("origin {url}: {e}"))
        } else {
            Error::upstream(format!("origin {url}: {e}"))
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%url, %status, "origin refused relay request");
        return Err(Error::upstream(format!("origin answered {status}")).into());
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let is_playlist = options.kind == MediaKind::Hls
        || content_type
            .as_deref()
            .is_some_and(|ct| MediaKind::from_content_type(ct) == MediaKind::Hls);

    if is_playlist {
        let base_url = request_base_url(&headers, &ctx.config);
        relay_playlist(&ctx, response, &url, options, &base_url).await
    } else {
        relay_passthrough(response, options, content_type)
    }
}

/// `OPTIONS /universal/stream/{token}` CORS preflight; headers come from the
/// router's CORS layer.
pub async fn universal_preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn relay_playlist(
    ctx: &AppContext,
    response: reqwest::Response,
    manifest_url: &str,
    options: ProxyOptions,
    base_url: &str,
) -> Result<Response<Body>, ApiError> {
    let body = response
        .text()
        .await
        .map_err(|e| Error::upstream(format!("reading playlist body: {e}")))?;

    let rewritten = rewrite_playlist(&body, manifest_url, options, &ctx.codec, base_url);
    tracing::debug!(
        manifest_url,
        bytes_in = body.len(),
        bytes_out = rewritten.len(),
        "rewrote playlist"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, MediaKind::Hls.content_type())
        .header(header::CONTENT_LENGTH, rewritten.len())
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(rewritten))
        .map_err(|e| ApiError(Error::internal(format!("response build failed: {e}"))))
}

fn relay_passthrough(
    response: reqwest::Response,
    options: ProxyOptions,
    content_type: Option<String>,
) -> Result<Response<Body>, ApiError> {
    let status = response.status();
    let mut builder = Response::builder()
        .status(status.as_u16())
        .header(
            header::CONTENT_TYPE,
            content_type.unwrap_or_else(|| options.kind.content_type().to_string()),
        )
        .header(header::CACHE_CONTROL, "no-cache");

    for name in MIRRORED_HEADERS {
        if let Some(value) = response.headers().get(name) {
            builder = builder.header(name, value.as_bytes());
        }
    }

    let stream = response.bytes_stream().inspect_err(|e| {
        tracing::warn!("origin stream interrupted: {e}");
    });

    builder
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError(Error::internal(format!("response build failed: {e}"))))
}
