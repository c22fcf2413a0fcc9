//! Core type definitions for quality selectors and media kinds.
//!
//! These enums appear inside capability tokens and API responses, so their
//! string forms are part of the wire format: short lowercase tags, stable
//! across releases. Parsing is deliberately lenient — an unrecognized quality
//! falls back to [`QualityLevel::Original`] and an unrecognized kind tag to
//! [`MediaKind::Generic`] — because a token holding an unknown-but-signed
//! selector must still verify.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Playback quality selector carried by resource tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    /// The source file as stored, no target constraints.
    Original,
    /// 1080p target.
    #[serde(rename = "1080p")]
    Q1080,
    /// 720p target.
    #[serde(rename = "720p")]
    Q720,
    /// 480p target.
    #[serde(rename = "480p")]
    Q480,
    /// 360p target.
    #[serde(rename = "360p")]
    Q360,
}

impl QualityLevel {
    /// Parse a quality selector. Unrecognized values fall back to the most
    /// conservative choice, `Original` — never an error.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "1080p" | "1080" => Self::Q1080,
            "720p" | "720" => Self::Q720,
            "480p" | "480" => Self::Q480,
            "360p" | "360" => Self::Q360,
            _ => Self::Original,
        }
    }

    /// Stable wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Q1080 => "1080p",
            Self::Q720 => "720p",
            Self::Q480 => "480p",
            Self::Q360 => "360p",
        }
    }

    /// Target vertical resolution for preset levels; `None` for `Original`.
    pub fn target_height(&self) -> Option<u32> {
        match self {
            Self::Original => None,
            Self::Q1080 => Some(1080),
            Self::Q720 => Some(720),
            Self::Q480 => Some(480),
            Self::Q360 => Some(360),
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media container/protocol kind carried by proxy tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// HLS playlist (m3u8).
    Hls,
    /// DASH manifest (mpd).
    Dash,
    /// MP4 container.
    Mp4,
    /// WebM container.
    WebM,
    /// Matroska container.
    Mkv,
    /// A single media segment referenced from a playlist.
    Segment,
    /// Anything else; relayed as opaque bytes.
    Generic,
}

impl MediaKind {
    /// Parse a wire tag. Unknown tags map to `Generic` so that tokens minted
    /// by a newer build still verify on an older one.
    pub fn parse(s: &str) -> Self {
        match s {
            "hls" => Self::Hls,
            "dash" => Self::Dash,
            "mp4" => Self::Mp4,
            "webm" => Self::WebM,
            "mkv" => Self::Mkv,
            "seg" => Self::Segment,
            _ => Self::Generic,
        }
    }

    /// Stable wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hls => "hls",
            Self::Dash => "dash",
            Self::Mp4 => "mp4",
            Self::WebM => "webm",
            Self::Mkv => "mkv",
            Self::Segment => "seg",
            Self::Generic => "bin",
        }
    }

    /// Detect the kind from a source URL's path extension.
    pub fn from_url(url: &str) -> Self {
        // Drop query/fragment before looking at the extension.
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let ext = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
        match ext.as_str() {
            "m3u8" | "m3u" => Self::Hls,
            "mpd" => Self::Dash,
            "mp4" | "m4v" | "mov" => Self::Mp4,
            "webm" => Self::WebM,
            "mkv" => Self::Mkv,
            "ts" | "m4s" | "aac" | "mp2t" => Self::Segment,
            _ => Self::Generic,
        }
    }

    /// Detect the kind from a declared content type.
    pub fn from_content_type(content_type: &str) -> Self {
        let ct = content_type.to_ascii_lowercase();
        if ct.contains("mpegurl") || ct.contains("m3u8") {
            Self::Hls
        } else if ct.contains("dash+xml") {
            Self::Dash
        } else if ct.contains("video/mp4") {
            Self::Mp4
        } else if ct.contains("video/webm") {
            Self::WebM
        } else if ct.contains("matroska") {
            Self::Mkv
        } else if ct.contains("video/mp2t") || ct.contains("iso.segment") {
            Self::Segment
        } else {
            Self::Generic
        }
    }

    /// Content type to declare when the upstream does not provide one.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Hls => "application/vnd.apple.mpegurl",
            Self::Dash => "application/dash+xml",
            Self::Mp4 => "video/mp4",
            Self::WebM => "video/webm",
            Self::Mkv => "video/x-matroska",
            Self::Segment => "video/mp2t",
            Self::Generic => "application/octet-stream",
        }
    }

    /// File extension appended to tokenized relay URLs, chosen so players
    /// that sniff extensions pick the right demuxer.
    pub fn url_extension(&self) -> &'static str {
        match self {
            Self::Hls => ".m3u8",
            Self::Dash => ".mpd",
            Self::Mp4 => ".mp4",
            Self::WebM => ".webm",
            Self::Mkv => ".mkv",
            Self::Segment => ".ts",
            Self::Generic => "",
        }
    }

    /// Whether bodies of this kind are text playlists that must be buffered
    /// and rewritten rather than streamed through.
    pub fn is_playlist(&self) -> bool {
        matches!(self, Self::Hls | Self::Dash)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options bag carried by proxy tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyOptions {
    /// Client requested server-side buffering hints.
    pub buffering: bool,
    /// Segment traffic should flow through the relay (vs. origin-direct).
    pub proxied: bool,
    /// Detected media kind of the wrapped URL.
    pub kind: MediaKind,
}

impl ProxyOptions {
    /// Wire form: `{kind}-{buffering}{proxied}`, e.g. `hls-10`.
    pub fn encode(&self) -> String {
        format!(
            "{}-{}{}",
            self.kind.as_str(),
            u8::from(self.buffering),
            u8::from(self.proxied)
        )
    }

    /// Decode the wire form. Missing or damaged flags decode to `false`,
    /// matching the lenient-selector rule.
    pub fn decode(s: &str) -> Self {
        let (kind, flags) = s.split_once('-').unwrap_or((s, ""));
        let mut chars = flags.chars();
        let buffering = chars.next() == Some('1');
        let proxied = chars.next() == Some('1');
        Self {
            buffering,
            proxied,
            kind: MediaKind::parse(kind),
        }
    }
}
