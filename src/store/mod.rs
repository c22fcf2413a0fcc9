//! Upstream file-store abstraction.
//!
//! The store is an external collaborator: it owns resource metadata and can
//! serve byte ranges of resource content. Relaycast only needs those two
//! calls, expressed as the [`ResourceStore`] trait so tests can substitute a
//! mock server and the relay never depends on a concrete backend.

mod http;

pub use http::HttpResourceStore;

use bytes::Bytes;
use futures::Stream;
use relaycast_common::Result;
use relaycast_media::RawMediaInfo;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Byte stream handed back by `read_range`; already windowed to the
/// requested range.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send + 'static>>;

/// Video stream properties reported by the store, when the resource has any.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoStreamInfo {
    pub width: u32,
    pub height: u32,
    pub duration_millis: u64,
}

/// Resource metadata as reported by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub id: String,
    pub name: String,
    #[serde(rename = "byteSize")]
    pub size: u64,
    pub mime_type: String,
    #[serde(default)]
    pub video: Option<VideoStreamInfo>,
}

impl FileMeta {
    /// Whether the declared mime type is a video format.
    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }

    /// Project into the analyzer's input shape.
    pub fn media_info(&self) -> RawMediaInfo {
        let video = self.video.clone().unwrap_or_default();
        RawMediaInfo {
            width: video.width,
            height: video.height,
            duration_millis: video.duration_millis,
            byte_size: self.size,
            mime_type: Some(self.mime_type.clone()),
        }
    }
}

/// Client interface to the file store.
#[async_trait::async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch metadata for one resource.
    async fn metadata(&self, file_id: &str) -> Result<FileMeta>;

    /// Open a content stream for the inclusive byte window `[start, end]`.
    async fn read_range(&self, file_id: &str, start: u64, end: u64) -> Result<ByteStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_meta_is_video() {
        let meta = FileMeta {
            id: "x".into(),
            name: "clip.mp4".into(),
            size: 10,
            mime_type: "video/mp4".into(),
            video: None,
        };
        assert!(meta.is_video());

        let meta = FileMeta {
            mime_type: "application/pdf".into(),
            ..meta
        };
        assert!(!meta.is_video());
    }

    #[test]
    fn test_media_info_projection() {
        let meta = FileMeta {
            id: "x".into(),
            name: "clip.mp4".into(),
            size: 600_000_000,
            mime_type: "video/mp4".into(),
            video: Some(VideoStreamInfo {
                width: 1920,
                height: 1080,
                duration_millis: 600_000,
            }),
        };
        let info = meta.media_info();
        assert_eq!(info.width, 1920);
        assert_eq!(info.byte_size, 600_000_000);
        assert_eq!(info.mime_type.as_deref(), Some("video/mp4"));
    }
}
