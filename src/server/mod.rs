use crate::cache::TtlCache;
use crate::config::Config;
use crate::store::{FileMeta, HttpResourceStore, ResourceStore};
use crate::streaming;
use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderMap, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use relaycast_common::Error;
use relaycast_token::TokenCodec;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

mod error;
pub mod routes_api;

pub use error::ApiError;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Token issue/verify, built from the configured secret and TTL
    pub codec: Arc<TokenCodec>,
    /// File-store client; `None` when no store is configured
    pub store: Option<Arc<dyn ResourceStore>>,
    /// Metadata lookups are cached so repeated range requests for one
    /// resource hit the store once
    pub metadata_cache: Arc<TtlCache<String, FileMeta>>,
    /// Shared client for relayed origin requests
    pub http: reqwest::Client,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        let codec = TokenCodec::new(
            config.proxy.secret.as_bytes().to_vec(),
            Duration::from_secs(config.proxy.token_ttl_hours * 3600),
        );
        let upstream_timeout = Duration::from_secs(config.proxy.upstream_timeout_secs);

        let store = config.store.as_ref().map(|store_config| {
            Arc::new(HttpResourceStore::new(store_config, upstream_timeout))
                as Arc<dyn ResourceStore>
        });

        let metadata_cache = Arc::new(TtlCache::new(
            config.proxy.metadata_cache_entries,
            Duration::from_secs(config.proxy.metadata_cache_ttl_secs),
        ));

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(upstream_timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        Self {
            config: Arc::new(config),
            codec: Arc::new(codec),
            store,
            metadata_cache,
            http,
        }
    }

    /// The configured store, or an upstream error when this deployment has
    /// none.
    pub fn store(&self) -> Result<&Arc<dyn ResourceStore>, Error> {
        self.store
            .as_ref()
            .ok_or_else(|| Error::upstream("no file store configured"))
    }

    /// Fetch file metadata through the cache.
    pub async fn file_metadata(&self, file_id: &str) -> Result<FileMeta, Error> {
        if let Some(meta) = self.metadata_cache.get(&file_id.to_string()) {
            return Ok(meta);
        }
        let meta = self.store()?.metadata(file_id).await?;
        self.metadata_cache.insert(file_id.to_string(), meta.clone());
        Ok(meta)
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS, Method::HEAD])
        .allow_headers([header::CONTENT_TYPE, header::RANGE])
        .expose_headers([
            header::CONTENT_RANGE,
            header::CONTENT_LENGTH,
            header::ACCEPT_RANGES,
        ]);

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/universal/generate", post(routes_api::universal_generate))
        .nest("/universal/stream", streaming::universal_router());

    // Store-backed routes only make sense with a store configured.
    if ctx.store.is_some() {
        app = app
            .route("/analyze", post(routes_api::analyze_file))
            .route("/generate-link", post(routes_api::generate_link))
            .nest("/stream", streaming::stream_router());
        tracing::info!("File-store routes enabled");
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Public base URL for links minted in responses and rewritten playlists.
///
/// Forwarded headers win so deployments behind a reverse proxy mint URLs the
/// client can actually reach; then the request's own Host header; then the
/// configured fallback.
pub fn request_base_url(headers: &HeaderMap, config: &Config) -> String {
    let forwarded_host = headers
        .get("x-forwarded-host")
        .and_then(|v| v.to_str().ok());
    if let Some(host) = forwarded_host {
        let proto = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("https");
        return format!("{proto}://{host}");
    }

    if let Some(host) = headers.get(header::HOST).and_then(|v| v.to_str().ok()) {
        return format!("http://{host}");
    }

    if let Some(base) = &config.server.public_base_url {
        return base.trim_end_matches('/').to_string();
    }

    format!("http://{}:{}", config.server.host, config.server.port)
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = AppContext::new(config);
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
