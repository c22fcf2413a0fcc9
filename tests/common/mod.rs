//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which builds a full [`AppContext`] from a test
//! config, with the file store pointed at a wiremock server. The
//! [`with_server`] constructors start Axum on a random port so tests exercise
//! the real HTTP surface with reqwest.

use std::net::SocketAddr;

use relaycast::config::{Config, StoreConfig};
use relaycast::server::{create_router, AppContext};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Test harness wrapping a fully-constructed [`AppContext`].
pub struct TestHarness {
    pub ctx: AppContext,
}

impl TestHarness {
    /// Create a harness whose file store points at `store_base_url`.
    pub fn with_store(store_base_url: &str) -> Self {
        let mut config = test_config();
        config.store = Some(StoreConfig {
            base_url: store_base_url.to_string(),
            api_key: Some("test-api-key".to_string()),
        });
        Self {
            ctx: AppContext::new(config),
        }
    }

    /// Create a harness with no file store configured.
    pub fn without_store() -> Self {
        Self {
            ctx: AppContext::new(test_config()),
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server(store_base_url: &str) -> (Self, SocketAddr) {
        let harness = Self::with_store(store_base_url);
        let addr = harness.spawn().await;
        (harness, addr)
    }

    /// Start a store-less server on a random port.
    pub async fn with_server_no_store() -> (Self, SocketAddr) {
        let harness = Self::without_store();
        let addr = harness.spawn().await;
        (harness, addr)
    }

    async fn spawn(&self) -> SocketAddr {
        let app = create_router(self.ctx.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        addr
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.proxy.secret = TEST_SECRET.to_string();
    config.proxy.upstream_timeout_secs = 5;
    config
}
