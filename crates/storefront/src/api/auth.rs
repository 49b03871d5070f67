//! Auth and health endpoints.

use nyraa_core::Email;
use reqwest::Method;
use tracing::instrument;

use crate::models::UserProfile;

use super::client::Auth;
use super::types::{
    AckEnvelope, AuthResponse, ForgotPasswordRequest, GoogleLoginRequest, HealthResponse,
    PasswordLoginRequest, ProfileEnvelope, SendOtpRequest, VerifyOtpRequest,
};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Probe server reachability.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the server is unreachable or unhealthy.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.get_json("api/health", Auth::Public).await
    }

    /// Request a one-time password to be mailed to `email`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    #[instrument(skip(self))]
    pub async fn send_otp(&self, email: &Email) -> Result<AckEnvelope, ApiError> {
        self.send_json(
            Method::POST,
            "api/auth/send-otp",
            &SendOtpRequest { email },
            Auth::Public,
        )
        .await
    }

    /// Exchange an emailed OTP for a session token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] if the backend declines the code.
    #[instrument(skip(self, otp))]
    pub async fn verify_otp(&self, email: &Email, otp: &str) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self
            .send_json(
                Method::POST,
                "api/auth/verify-otp",
                &VerifyOtpRequest { email, otp },
                Auth::Public,
            )
            .await?;
        require_success(response)
    }

    /// Email/password login.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the credentials are rejected.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &Email, password: &str) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self
            .send_json(
                Method::POST,
                "api/auth/login",
                &PasswordLoginRequest { email, password },
                Auth::Public,
            )
            .await?;
        require_success(response)
    }

    /// Google sign-in with the OAuth widget's ID token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the token is rejected.
    #[instrument(skip(self, credential))]
    pub async fn login_google(&self, credential: &str) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self
            .send_json(
                Method::POST,
                "api/auth/google",
                &GoogleLoginRequest { credential },
                Auth::Public,
            )
            .await?;
        require_success(response)
    }

    /// Trigger the password-reset email.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &Email) -> Result<AckEnvelope, ApiError> {
        self.send_json(
            Method::POST,
            "api/auth/forgot-password",
            &ForgotPasswordRequest { email },
            Auth::Public,
        )
        .await
    }

    /// The whoami round-trip: fetch the profile behind the bearer token.
    ///
    /// Never cached: the checkout gate relies on this observing a freshly
    /// revoked token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if the token is missing or stale.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        let envelope: ProfileEnvelope = self.get_json("api/auth/profile", Auth::Bearer).await?;
        Ok(envelope.user)
    }
}

/// Reject token responses flagged `success: false`.
fn require_success(response: AuthResponse) -> Result<AuthResponse, ApiError> {
    if response.success {
        Ok(response)
    } else {
        Err(ApiError::Rejected(
            response
                .message
                .unwrap_or_else(|| "authentication rejected".to_string()),
        ))
    }
}
