//! User profile model.

use nyraa_core::{Email, UserId};
use serde::{Deserialize, Serialize};

/// User profile as returned by the auth endpoints.
///
/// Every field except `email` is optional: legacy `userData` blobs written by
/// earlier frontend versions carry different subsets, and the session logic
/// only requires the email to consider credentials usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, alias = "_id")]
    pub id: Option<UserId>,
    #[serde(default)]
    pub name: Option<String>,
    pub email: Option<Email>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl UserProfile {
    /// Profile with only an email, the minimum the session logic needs.
    #[must_use]
    pub const fn from_email(email: Email) -> Self {
        Self {
            id: None,
            name: None,
            email: Some(email),
            phone: None,
        }
    }
}
