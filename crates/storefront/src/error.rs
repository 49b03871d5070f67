//! Unified error handling.
//!
//! Every subsystem has its own error enum; `AppError` unifies them at the
//! application boundary. The legacy frontend classified failures by
//! substring-matching toast text; here the classification is structural:
//! [`AppError::user_message`] and [`AppError::is_retryable`] are derived from
//! the variants, never from message contents.

use thiserror::Error;

use crate::addresses::AddressError;
use crate::api::ApiError;
use crate::auth::AuthError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::orders::OrderHistoryError;
use crate::store::StateError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Client state operation failed.
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Backend API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Address book operation failed.
    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    /// Checkout flow error.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Order history error.
    #[error("Order error: {0}")]
    Orders(#[from] OrderHistoryError),
}

impl AppError {
    /// The message a frontend should show for this error.
    ///
    /// These are the texts the storefront has always shown; they are chosen
    /// by variant, not by inspecting message strings.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => api_message(e),
            Self::Auth(AuthError::Api(e)) => api_message(e),
            Self::Auth(AuthError::SessionExpired) => {
                "Your session has expired. Please log in again.".to_string()
            }
            Self::Auth(AuthError::NotLoggedIn) => "Please log in to continue.".to_string(),
            Self::Auth(AuthError::InvalidEmail(e)) => format!("Invalid email address: {e}."),
            Self::Checkout(e) => checkout_message(e),
            Self::Address(AddressError::MissingField(field)) => {
                format!("Please fill all required fields (missing: {field}).")
            }
            Self::Address(AddressError::Api(e)) => api_message(e),
            Self::Orders(OrderHistoryError::NotCancellable { status, .. }) => {
                format!("This order can no longer be cancelled (status: {status}).")
            }
            Self::Orders(OrderHistoryError::Api(e)) => api_message(e),
            Self::State(_) | Self::Auth(AuthError::State(_)) | Self::Address(AddressError::State(_)) => {
                "Could not save your data locally. Please try again.".to_string()
            }
            Self::Config(e) => e.to_string(),
            Self::Address(AddressError::NotFound(_)) => "Address not found.".to_string(),
        }
    }

    /// Whether retrying the same action later could succeed without any
    /// other intervention.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Api(e)
            | Self::Auth(AuthError::Api(e))
            | Self::Address(AddressError::Api(e))
            | Self::Orders(OrderHistoryError::Api(e))
            | Self::Checkout(CheckoutError::Api(e)) => e.is_retryable(),
            Self::Checkout(
                CheckoutError::NotReady(_) | CheckoutError::SubmissionInFlight,
            ) => true,
            _ => false,
        }
    }
}

fn api_message(e: &ApiError) -> String {
    match e {
        ApiError::Connect(_) | ApiError::Timeout => {
            "Cannot connect to the server. Please ensure the backend is running.".to_string()
        }
        ApiError::Unauthorized => "Authentication required. Please log in again.".to_string(),
        ApiError::NotFound(_) => "The requested item was not found.".to_string(),
        ApiError::RateLimited { retry_after } => {
            format!("Too many requests. Please retry in {retry_after} seconds.")
        }
        ApiError::Rejected(message) => message.clone(),
        ApiError::Server { status, .. } => {
            format!("The server reported an error ({status}). Please try again.")
        }
        ApiError::Decode(_) | ApiError::Endpoint(_) | ApiError::Http(_) => {
            "Something went wrong talking to the server. Please try again.".to_string()
        }
    }
}

fn checkout_message(e: &CheckoutError) -> String {
    match e {
        CheckoutError::NotReady(outcome) => match outcome {
            crate::checkout::GateOutcome::ServerOffline => {
                "Cannot connect to the server. Please ensure the backend is running.".to_string()
            }
            crate::checkout::GateOutcome::SessionExpired => {
                "Your session has expired. Please log in again.".to_string()
            }
            _ => "Please log in to proceed with checkout.".to_string(),
        },
        CheckoutError::EmptyCart => "Your cart is empty.".to_string(),
        CheckoutError::NoAddressSelected | CheckoutError::AddressNotFound(_) => {
            "Please select or add a shipping address.".to_string()
        }
        CheckoutError::AuthRequired => "Please log in to proceed with checkout.".to_string(),
        CheckoutError::SubmissionInFlight => {
            "Your order is already being submitted.".to_string()
        }
        CheckoutError::Api(e) => api_message(e),
        CheckoutError::State(_) => "Could not save your data locally. Please try again.".to_string(),
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use crate::checkout::GateOutcome;

    use super::*;

    #[test]
    fn test_connection_errors_map_to_server_message() {
        let err = AppError::Api(ApiError::Connect("refused".to_string()));
        assert!(err.user_message().contains("Cannot connect"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_session_expiry_message() {
        let err = AppError::Auth(AuthError::SessionExpired);
        assert!(err.user_message().contains("session has expired"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_checkout_blockers_are_not_server_errors() {
        let err = AppError::Checkout(CheckoutError::EmptyCart);
        assert_eq!(err.user_message(), "Your cart is empty.");
        assert!(!err.is_retryable());

        let err = AppError::Checkout(CheckoutError::NotReady(GateOutcome::ServerOffline));
        assert!(err.user_message().contains("Cannot connect"));
        assert!(err.is_retryable());
    }
}
