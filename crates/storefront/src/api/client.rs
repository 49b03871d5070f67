//! HTTP plumbing for the backend API client.

use std::sync::{Arc, RwLock};

use moka::future::Cache;
use reqwest::{Method, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::StorefrontConfig;
use crate::models::{Address, Order, OrderPage, OrderStats};

use super::ApiError;
use super::types::ErrorBody;

/// Cached read-side responses, keyed by endpoint-specific strings.
#[derive(Debug, Clone)]
pub(super) enum CacheValue {
    Orders(OrderPage),
    Order(Box<Order>),
    Addresses(Vec<Address>),
    Stats(OrderStats),
}

/// Client for the Nyraa backend REST API.
///
/// Cheaply cloneable; all clones share the HTTP connection pool, the bearer
/// token, and the response cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new API client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_base_url.clone(),
                token: RwLock::new(None),
                cache,
            }),
        })
    }

    /// Install or clear the bearer token.
    ///
    /// Changing identity also drops every cached response.
    pub fn set_bearer(&self, token: Option<SecretString>) {
        {
            let mut guard = self
                .inner
                .token
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            *guard = token;
        }
        self.inner.cache.invalidate_all();
    }

    /// Whether a bearer token is currently installed.
    #[must_use]
    pub fn has_bearer(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }

    pub(super) async fn cache_get(&self, key: &str) -> Option<CacheValue> {
        self.inner.cache.get(key).await
    }

    pub(super) async fn cache_put(&self, key: String, value: CacheValue) {
        self.inner.cache.insert(key, value).await;
    }

    /// Drop every cached response (called after any write).
    pub(super) fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    /// GET a JSON response.
    pub(super) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        auth: Auth,
    ) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::GET, path, None, auth).await
    }

    /// Send a JSON body and parse a JSON response.
    pub(super) async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        auth: Auth,
    ) -> Result<T, ApiError> {
        self.request(method, path, Some(body), auth).await
    }

    /// Send a bodyless non-GET request and parse a JSON response.
    pub(super) async fn send_empty<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        auth: Auth,
    ) -> Result<T, ApiError> {
        self.request::<T, ()>(method, path, None, auth).await
    }

    async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        auth: Auth,
    ) -> Result<T, ApiError> {
        let url = self.inner.base_url.join(path)?;

        let mut builder = self
            .inner
            .http
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json");

        if auth == Auth::Bearer {
            let guard = self
                .inner
                .token
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            // Fail before the wire: an authed call without a token can only 401.
            let token = guard.as_ref().ok_or(ApiError::Unauthorized)?;
            builder = builder.bearer_auth(token.expose_secret());
        }

        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ApiError::from)?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited { retry_after });
        }

        // Read the body as text first for better error diagnostics.
        let text = response.text().await.map_err(ApiError::from)?;

        if !status.is_success() {
            return Err(classify_failure(status, path, &text));
        }

        match serde_json::from_str(&text) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                debug!(
                    path,
                    body = %text.chars().take(500).collect::<String>(),
                    "failed to parse response body"
                );
                Err(ApiError::Decode(e))
            }
        }
    }
}

/// Whether a request carries the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Auth {
    Public,
    Bearer,
}

/// Map a non-success status to an [`ApiError`], pulling the message out of
/// the `{ "message": ... }` error body when present.
fn classify_failure(status: StatusCode, path: &str, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                body.chars().take(200).collect()
            }
        });

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(path.to_string()),
        _ => ApiError::Server {
            status: status.as_u16(),
            message,
        },
    }
}
