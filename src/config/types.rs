use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    /// File-store backend. Routes that need it (/analyze, /generate-link,
    /// /stream) are only mounted when this section is present.
    #[serde(default)]
    pub store: Option<StoreConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL used for generated links when no forwarded-proto/host
    /// headers are present (e.g. behind no reverse proxy).
    #[serde(default)]
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
    /// Shared signing secret for capability tokens (generate with
    /// `relaycast generate-secret`).
    #[serde(default)]
    pub secret: String,

    /// Token lifetime in hours (default: 24)
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: u64,

    /// Ceiling for upstream requests in seconds (default: 30)
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,

    /// Metadata cache entry lifetime in seconds (default: 300)
    #[serde(default = "default_cache_ttl")]
    pub metadata_cache_ttl_secs: u64,

    /// Metadata cache capacity (default: 1024)
    #[serde(default = "default_cache_entries")]
    pub metadata_cache_entries: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Base URL of the file-store API.
    pub base_url: String,

    /// API key sent as a bearer token, if the store requires one.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_token_ttl() -> u64 {
    24
}
fn default_upstream_timeout() -> u64 {
    30
}
fn default_cache_ttl() -> u64 {
    300
}
fn default_cache_entries() -> usize {
    1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_base_url: None,
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_ttl_hours: default_token_ttl(),
            upstream_timeout_secs: default_upstream_timeout(),
            metadata_cache_ttl_secs: default_cache_ttl(),
            metadata_cache_entries: default_cache_entries(),
        }
    }
}
