//! JSON API: analysis and link generation.

use axum::{extract::State, http::HeaderMap, Json};
use relaycast_common::{Error, MediaKind, ProxyOptions, QualityLevel};
use relaycast_media::{analyze, QualityReport};
use relaycast_token::TokenPayload;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::store::FileMeta;

use super::{request_base_url, ApiError, AppContext};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Share URL or bare file id.
    pub resource_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub file_id: String,
    pub name: String,
    pub mime_type: String,
    pub quality: QualityReport,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateLinkRequest {
    /// Share URL; `fileId` may be given instead.
    #[serde(default)]
    pub resource_url: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub quality_option: Option<String>,
}

/// File summary echoed back alongside a generated link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub id: String,
    pub name: String,
    pub byte_size: u64,
    pub mime_type: String,
}

impl From<&FileMeta> for FileInfo {
    fn from(meta: &FileMeta) -> Self {
        Self {
            id: meta.id.clone(),
            name: meta.name.clone(),
            byte_size: meta.size,
            mime_type: meta.mime_type.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateLinkResponse {
    pub stream_url: String,
    pub selected_quality: QualityLevel,
    pub file_info: FileInfo,
    pub quality: QualityReport,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversalGenerateRequest {
    pub source_url: String,
    #[serde(default)]
    pub enable_buffer: bool,
    #[serde(default = "default_proxied")]
    pub enable_proxy: bool,
}

fn default_proxied() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversalGenerateResponse {
    pub proxy_url: String,
    pub stream_type: MediaKind,
    pub buffering: bool,
    pub proxied: bool,
}

/// `POST /analyze`: look a shared file up and report its quality.
pub async fn analyze_file(
    State(ctx): State<AppContext>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let file_id = extract_file_id(&request.resource_url)
        .ok_or_else(|| Error::invalid_input("could not extract a file id from the URL"))?;

    let meta = fetch_video(&ctx, &file_id).await?;
    let report = analyze(&meta.media_info());

    Ok(Json(AnalyzeResponse {
        file_id,
        name: meta.name,
        mime_type: meta.mime_type,
        quality: report,
    }))
}

/// `POST /generate-link`: mint a tokenized streaming URL for a stored file.
pub async fn generate_link(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(request): Json<GenerateLinkRequest>,
) -> Result<Json<GenerateLinkResponse>, ApiError> {
    let file_id = match (&request.file_id, &request.resource_url) {
        (Some(id), _) => extract_file_id(id),
        (None, Some(url)) => extract_file_id(url),
        (None, None) => None,
    }
    .ok_or_else(|| Error::invalid_input("resourceUrl or fileId is required"))?;

    let meta = fetch_video(&ctx, &file_id).await?;
    let report = analyze(&meta.media_info());

    let quality = request
        .quality_option
        .as_deref()
        .map(QualityLevel::parse)
        .unwrap_or(QualityLevel::Original);

    let token = ctx.codec.issue(&TokenPayload::Resource {
        file_id,
        quality,
    });
    let base_url = request_base_url(&headers, &ctx.config);

    Ok(Json(GenerateLinkResponse {
        stream_url: format!("{base_url}/stream/{token}.mp4"),
        selected_quality: quality,
        file_info: FileInfo::from(&meta),
        quality: report,
    }))
}

/// `POST /universal/generate`: mint a tokenized relay URL for any media URL.
pub async fn universal_generate(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(request): Json<UniversalGenerateRequest>,
) -> Result<Json<UniversalGenerateResponse>, ApiError> {
    let parsed = url::Url::parse(&request.source_url)
        .map_err(|e| Error::invalid_input(format!("invalid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::invalid_input(format!(
            "unsupported URL scheme: {}",
            parsed.scheme()
        ))
        .into());
    }

    let kind = MediaKind::from_url(parsed.as_str());
    let options = ProxyOptions {
        buffering: request.enable_buffer,
        proxied: request.enable_proxy,
        kind,
    };
    let token = ctx.codec.issue(&TokenPayload::Proxy {
        url: parsed.into(),
        options,
    });
    let base_url = request_base_url(&headers, &ctx.config);

    Ok(Json(UniversalGenerateResponse {
        proxy_url: format!(
            "{base_url}/universal/stream/{token}{}",
            kind.url_extension()
        ),
        stream_type: kind,
        buffering: options.buffering,
        proxied: options.proxied,
    }))
}

/// Resolve a file id to metadata, rejecting non-video resources.
async fn fetch_video(ctx: &AppContext, file_id: &str) -> Result<FileMeta, ApiError> {
    let meta = ctx.file_metadata(file_id).await?;
    if !meta.is_video() {
        return Err(Error::not_found(format!(
            "file {file_id} is not a video ({})",
            meta.mime_type
        ))
        .into());
    }
    Ok(meta)
}

/// Pull a file id out of a share URL.
///
/// Accepts the `/file/d/{id}` path form, the `?id={id}` query form, and a
/// bare id (10+ chars of the id alphabet).
pub fn extract_file_id(input: &str) -> Option<String> {
    static PATH_RE: OnceLock<regex::Regex> = OnceLock::new();
    static QUERY_RE: OnceLock<regex::Regex> = OnceLock::new();
    static BARE_RE: OnceLock<regex::Regex> = OnceLock::new();

    let input = input.trim();

    let path_re =
        PATH_RE.get_or_init(|| regex::Regex::new(r"/file/d/([A-Za-z0-9_-]+)").unwrap());
    if let Some(captures) = path_re.captures(input) {
        return Some(captures[1].to_string());
    }

    let query_re =
        QUERY_RE.get_or_init(|| regex::Regex::new(r"[?&]id=([A-Za-z0-9_-]+)").unwrap());
    if let Some(captures) = query_re.captures(input) {
        return Some(captures[1].to_string());
    }

    let bare_re = BARE_RE.get_or_init(|| regex::Regex::new(r"^[A-Za-z0-9_-]{10,}$").unwrap());
    if bare_re.is_match(input) {
        return Some(input.to_string());
    }

    None
}
