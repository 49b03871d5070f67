//! Session service.
//!
//! Owns the login flows (OTP, password, Google) and the persisted session.
//! A successful login writes the session into client state and installs the
//! bearer token on the API client; a failed whoami clears both, which is the
//! "session expired, log in again" path of the old frontend.

use nyraa_core::{Email, EmailError};
use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, info};

use crate::api::types::AuthResponse;
use crate::api::{ApiClient, ApiError};
use crate::models::{Session, UserProfile};
use crate::store::{StateError, StateStore};

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// No locally stored credentials.
    #[error("not logged in")]
    NotLoggedIn,

    /// The server rejected the stored token; the local session was cleared.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// Backend API error.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Client state error.
    #[error(transparent)]
    State(#[from] StateError),
}

/// Authentication service over the state store and API client.
pub struct SessionService<'a> {
    store: &'a StateStore,
    api: &'a ApiClient,
}

impl<'a> SessionService<'a> {
    /// Create a new session service.
    #[must_use]
    pub const fn new(store: &'a StateStore, api: &'a ApiClient) -> Self {
        Self { store, api }
    }

    /// The locally cached session, if any.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.store.read(|state| state.session.clone())
    }

    /// Local credential check: token and user email both present.
    ///
    /// This is only the offline half of authentication; [`Self::verify`]
    /// performs the round-trip.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store
            .read(|state| state.session.as_ref().is_some_and(Session::is_usable))
    }

    /// Request an OTP for `email`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`] before anything hits the wire.
    pub async fn request_otp(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        self.api.send_otp(&email).await?;
        info!(%email, "otp requested");
        Ok(())
    }

    /// Exchange an emailed OTP for a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the code is rejected or state cannot be saved.
    pub async fn login_with_otp(&self, email: &str, otp: &str) -> Result<Session, AuthError> {
        let email = Email::parse(email)?;
        let response = self.api.verify_otp(&email, otp).await?;
        self.install(response)
    }

    /// Email/password login.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the credentials are rejected.
    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let email = Email::parse(email)?;
        let response = self.api.login(&email, password).await?;
        self.install(response)
    }

    /// Google sign-in with the OAuth widget's ID token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the token is rejected.
    pub async fn login_with_google(&self, credential: &str) -> Result<Session, AuthError> {
        let response = self.api.login_google(credential).await?;
        self.install(response)
    }

    /// Trigger the password-reset email.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`] or an [`ApiError`].
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        self.api.forgot_password(&email).await?;
        Ok(())
    }

    /// Clear the session locally and drop the bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the cleared state cannot be persisted.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.mutate(|state| state.session = None)?;
        self.api.set_bearer(None);
        info!("logged out");
        Ok(())
    }

    /// The whoami round-trip: confirm the stored token against the server
    /// and refresh the cached profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotLoggedIn`] without local credentials, and
    /// [`AuthError::SessionExpired`] (after clearing the session) when the
    /// server rejects the token.
    pub async fn verify(&self) -> Result<UserProfile, AuthError> {
        let session = self
            .current()
            .filter(Session::is_usable)
            .ok_or(AuthError::NotLoggedIn)?;

        // The token may not be installed yet after a fresh process start.
        if !self.api.has_bearer() {
            self.api
                .set_bearer(Some(SecretString::from(session.token.clone())));
        }

        match self.api.profile().await {
            Ok(user) => {
                self.store.mutate(|state| {
                    if let Some(session) = &mut state.session {
                        session.user = user.clone();
                    }
                })?;
                Ok(user)
            }
            Err(ApiError::Unauthorized) => {
                debug!("stored token rejected, clearing session");
                self.logout()?;
                Err(AuthError::SessionExpired)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Re-install the bearer token from a persisted session, if any.
    ///
    /// Called once at startup so a restarted process picks up where the last
    /// one left off.
    pub fn restore(&self) {
        if let Some(session) = self.current().filter(Session::is_usable) {
            self.api
                .set_bearer(Some(SecretString::from(session.token)));
        }
    }

    fn install(&self, response: AuthResponse) -> Result<Session, AuthError> {
        let session = Session {
            token: response.token,
            user: response.user,
            logged_in_at: chrono::Utc::now(),
        };

        self.store
            .mutate(|state| state.session = Some(session.clone()))?;
        self.api
            .set_bearer(Some(SecretString::from(session.token.clone())));
        info!(email = ?session.user.email, "logged in");
        Ok(session)
    }
}
