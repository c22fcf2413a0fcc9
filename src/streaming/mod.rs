//! Streaming surface: range resolution, store streaming, the universal
//! relay, and playlist rewriting.

pub mod manifest;
pub mod range;
mod relay;
mod resource;

pub use range::{resolve_range, ResolvedRange};

use axum::{routing::get, Router};

use crate::server::AppContext;

/// Router for `/stream`: tokenized file-store streaming.
pub fn stream_router() -> Router<AppContext> {
    Router::new().route("/:token", get(resource::stream_resource))
}

/// Router for `/universal/stream`: tokenized relay of external URLs.
pub fn universal_router() -> Router<AppContext> {
    Router::new().route(
        "/:token",
        get(relay::universal_stream).options(relay::universal_preflight),
    )
}
