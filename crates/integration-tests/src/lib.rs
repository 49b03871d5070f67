//! Integration test harness for the Nyraa storefront client.
//!
//! Spins an in-process axum mock of the backend REST API on an ephemeral
//! port and a [`Storefront`] wired to it with a temp state file. The mock's
//! behavior is programmable per test: mark the server unhealthy, rotate the
//! accepted token, or make order creation fail.
//!
//! # Example
//!
//! ```rust,ignore
//! let ctx = TestContext::spawn().await;
//! ctx.login().await;
//! let report = ctx.app.gate().probe().await.unwrap();
//! assert!(report.state.system_ready());
//! ```

#![allow(clippy::unwrap_used)]

pub mod mock;

use std::path::PathBuf;

use tempfile::TempDir;
use url::Url;

use nyraa_storefront::Storefront;
use nyraa_storefront::config::StorefrontConfig;

pub use mock::{MockBackend, VALID_OTP, VALID_PASSWORD, VALID_TOKEN};

/// A running mock backend plus a storefront client wired to it.
pub struct TestContext {
    pub app: Storefront,
    pub backend: std::sync::Arc<MockBackend>,
    pub base_url: Url,
    state_dir: TempDir,
}

impl TestContext {
    /// Spawn a healthy mock backend and a fresh storefront.
    pub async fn spawn() -> Self {
        let (backend, base_url) = mock::serve().await;
        let state_dir = tempfile::tempdir().expect("create temp dir");

        let app = Storefront::init(StorefrontConfig::for_endpoint(
            base_url.clone(),
            state_dir.path().join("state.json"),
        ))
        .expect("init storefront");

        Self {
            app,
            backend,
            base_url,
            state_dir,
        }
    }

    /// Path of this context's state file.
    #[must_use]
    pub fn state_path(&self) -> PathBuf {
        self.state_dir.path().join("state.json")
    }

    /// Log in through the OTP flow against the mock.
    pub async fn login(&self) {
        self.app
            .sessions()
            .login_with_otp("asha@example.com", VALID_OTP)
            .await
            .expect("login against mock");
    }

    /// A second storefront over the same state file, pointed at `base_url`.
    ///
    /// Used to simulate a process restart or a backend moving between
    /// reachable and unreachable.
    pub fn storefront_at(&self, base_url: Url) -> Storefront {
        Storefront::init(StorefrontConfig::for_endpoint(base_url, self.state_path()))
            .expect("init storefront")
    }

    /// A base URL nothing listens on (connection refused).
    pub async fn unreachable_url() -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind probe listener");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);
        Url::parse(&format!("http://{addr}")).expect("parse url")
    }
}
