//! HTTP file-store client.
//!
//! Talks to a store exposing `GET /files/{id}` (JSON metadata) and
//! `GET /files/{id}/content` (ranged bytes). Transport failures are mapped
//! onto the relay's error taxonomy here so handlers never see reqwest errors.

use crate::config::StoreConfig;
use futures::TryStreamExt;
use relaycast_common::{Error, Result};
use reqwest::{header, Client, StatusCode};
use std::time::Duration;

use super::{ByteStream, FileMeta, ResourceStore};

/// Connection/response timeout for metadata lookups. Content streams use the
/// relay's configured upstream timeout instead.
const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpResourceStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpResourceStore {
    pub fn new(config: &StoreConfig, upstream_timeout: Duration) -> Self {
        let client = Client::builder()
            .connect_timeout(METADATA_TIMEOUT)
            .timeout(upstream_timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.get(self.url(path));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }
}

#[async_trait::async_trait]
impl ResourceStore for HttpResourceStore {
    async fn metadata(&self, file_id: &str) -> Result<FileMeta> {
        let response = self
            .request(&format!("/files/{file_id}"))
            .send()
            .await
            .map_err(map_transport_error)?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::not_found(format!("file {file_id}"))),
            status if status.is_success() => response
                .json::<FileMeta>()
                .await
                .map_err(|e| Error::upstream(format!("invalid store metadata: {e}"))),
            status => Err(Error::upstream(format!(
                "store answered {status} for file {file_id}"
            ))),
        }
    }

    async fn read_range(&self, file_id: &str, start: u64, end: u64) -> Result<ByteStream> {
        let response = self
            .request(&format!("/files/{file_id}/content"))
            .header(header::RANGE, format!("bytes={start}-{end}"))
            .send()
            .await
            .map_err(map_transport_error)?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::not_found(format!("file {file_id}"))),
            status if status.is_success() => {
                let stream = response.bytes_stream().map_err(std::io::Error::other);
                Ok(Box::pin(stream) as ByteStream)
            }
            status => Err(Error::upstream(format!(
                "store answered {status} for file {file_id} content"
            ))),
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::timeout(format!("file store: {e}"))
    } else {
        Error::upstream(format!("file store: {e}"))
    }
}
