//! Session model.
//!
//! The persisted session replaces the legacy `token` / `userData` /
//! `isLoggedIn` local-storage key triple with one typed record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserProfile;

/// A logged-in session held in client state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token issued by the auth endpoints.
    pub token: String,
    /// Profile returned alongside the token.
    pub user: UserProfile,
    /// When the session was established.
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    /// Whether the locally cached credentials are usable.
    ///
    /// Token and user email must both be present; a session missing either is
    /// treated as unauthenticated, exactly like the legacy `isAuthenticated`
    /// check.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.token.is_empty() && self.user.email.is_some()
    }
}

#[cfg(test)]
mod tests {
    use nyraa_core::Email;

    use super::*;

    fn session(token: &str, email: Option<&str>) -> Session {
        Session {
            token: token.to_string(),
            user: UserProfile {
                id: None,
                name: None,
                email: email.map(|e| Email::parse(e).expect("valid email")),
                phone: None,
            },
            logged_in_at: Utc::now(),
        }
    }

    #[test]
    fn test_usable_requires_token_and_email() {
        assert!(session("tok", Some("a@b.com")).is_usable());
        assert!(!session("", Some("a@b.com")).is_usable());
        assert!(!session("tok", None).is_usable());
    }
}
