//! HLS playlist rewriting.
//!
//! A relayed playlist is useless if its entries still point at the origin:
//! the player would bypass the relay (and its token gate) for every segment.
//! So each URI line is resolved against the playlist's own URL, wrapped in a
//! fresh proxy token, and replaced with a relay URL. Comment and tag lines
//! pass through byte-for-byte; nested playlists keep the playlist kind so the
//! relay rewrites them too when the player fetches them.

use relaycast_common::{MediaKind, ProxyOptions};
use relaycast_token::{TokenCodec, TokenPayload};
use url::Url;

/// Rewrite every URI line of an HLS playlist into a tokenized relay URL.
///
/// `manifest_url` is the absolute URL the playlist was fetched from; relative
/// entries are resolved against it. `base_url` is the public origin of this
/// relay, without a trailing slash.
pub fn rewrite_playlist(
    body: &str,
    manifest_url: &str,
    options: ProxyOptions,
    codec: &TokenCodec,
    base_url: &str,
) -> String {
    let Ok(origin) = Url::parse(manifest_url) else {
        tracing::warn!("cannot parse manifest URL {manifest_url:?}, passing playlist through");
        return body.to_string();
    };

    let mut out = String::with_capacity(body.len() * 2);
    for line in body.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            out.push_str(line);
        } else {
            match origin.join(trimmed) {
                Ok(resolved) => out.push_str(&tokenize_entry(resolved, options, codec, base_url)),
                Err(e) => {
                    tracing::warn!("unresolvable playlist entry {trimmed:?}: {e}");
                    out.push_str(line);
                }
            }
        }
        out.push('\n');
    }

    if !body.ends_with('\n') && out.ends_with('\n') {
        out.pop();
    }
    out
}

fn tokenize_entry(
    resolved: Url,
    options: ProxyOptions,
    codec: &TokenCodec,
    base_url: &str,
) -> String {
    // A nested .m3u8 is itself a playlist; everything else is segment data.
    let kind = match MediaKind::from_url(resolved.as_str()) {
        MediaKind::Hls => MediaKind::Hls,
        _ => MediaKind::Segment,
    };
    let token = codec.issue(&TokenPayload::Proxy {
        url: resolved.into(),
        options: ProxyOptions { kind, ..options },
    });
    format!("{base_url}/universal/stream/{token}{}", kind.url_extension())
}
