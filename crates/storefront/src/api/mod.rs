//! REST client for the Nyraa backend API.
//!
//! # Architecture
//!
//! - One [`ApiClient`] per process, cheaply cloneable (`Arc` inner)
//! - Bearer-token auth; the token is installed by the session service
//! - In-memory caching via `moka` for read endpoints, invalidated on writes
//! - Errors are classified structurally from status codes and error bodies,
//!   never by substring-matching message text
//!
//! # Endpoints
//!
//! - `/api/health` - reachability probe
//! - `/api/auth/*` - OTP, password, and Google sign-in, profile (whoami)
//! - `/api/orders*` - order creation, history, cancellation, stats
//! - `/api/user/addresses*` - address book CRUD

mod addresses;
mod auth;
mod client;
mod orders;
pub mod types;

pub use client::ApiClient;

use thiserror::Error;

/// Errors from the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server could not be reached at all.
    #[error("cannot reach server: {0}")]
    Connect(String),

    /// The request timed out.
    #[error("request timed out")]
    Timeout,

    /// Missing or rejected credentials (HTTP 401).
    #[error("authentication required")]
    Unauthorized,

    /// Resource not found (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limited (HTTP 429).
    #[error("rate limited, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    /// Any other non-success HTTP status.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// A 2xx response whose body reports `success: false`.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The response body did not parse as the expected shape.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Endpoint path could not be joined onto the base URL.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// Any other HTTP-layer failure.
    #[error("http error: {0}")]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else {
            Self::Http(e)
        }
    }
}

impl ApiError {
    /// Whether this failure means the server itself is unreachable, as
    /// opposed to the server answering with an error.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Timeout)
    }

    /// Whether retrying the same request later could plausibly succeed
    /// without any other action.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connect(_) | Self::Timeout | Self::RateLimited { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_classification() {
        assert!(ApiError::Timeout.is_unreachable());
        assert!(ApiError::Connect("refused".to_string()).is_unreachable());
        assert!(!ApiError::Unauthorized.is_unreachable());
        assert!(
            !ApiError::Server {
                status: 500,
                message: "boom".to_string()
            }
            .is_unreachable()
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ApiError::RateLimited { retry_after: 1 }.is_retryable());
        assert!(!ApiError::Unauthorized.is_retryable());
        assert!(!ApiError::Rejected("no".to_string()).is_retryable());
    }
}
