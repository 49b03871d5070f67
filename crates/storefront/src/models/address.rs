//! Address book models.

use nyraa_core::AddressId;
use serde::{Deserialize, Serialize};

/// Address category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    #[default]
    Home,
    Work,
    Other,
}

impl std::fmt::Display for AddressKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "home"),
            Self::Work => write!(f, "work"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for AddressKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "work" => Ok(Self::Work),
            "other" => Ok(Self::Other),
            _ => Err(format!("invalid address kind: {s}")),
        }
    }
}

/// A shipping/billing address.
///
/// Invariant: at most one address in a book has `is_default = true`. The
/// invariant is enforced in [`crate::addresses::AddressBook`], the single
/// place that applies address mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(alias = "_id")]
    pub id: AddressId,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    #[serde(rename = "type", default)]
    pub kind: AddressKind,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// Required-field validation, mirroring the add-address form check.
    ///
    /// # Errors
    ///
    /// Returns the name of the first missing field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name");
        }
        if self.street.trim().is_empty() {
            return Err("street");
        }
        if self.city.trim().is_empty() {
            return Err("city");
        }
        if self.state.trim().is_empty() {
            return Err("state");
        }
        if self.zip.trim().is_empty() {
            return Err("zip");
        }
        if self.phone.trim().is_empty() {
            return Err("phone");
        }
        Ok(())
    }
}

/// A journaled address mutation awaiting push to the backend.
///
/// Ops accumulate while the address book is offline and are replayed in
/// order by `AddressBook::reconcile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AddressOp {
    /// Create or update an address.
    Upsert { address: Address },
    /// Delete an address.
    Delete { id: AddressId },
    /// Mark an address as the default.
    SetDefault { id: AddressId },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> Address {
        Address {
            id: AddressId::new(1),
            name: "Asha Rao".to_string(),
            street: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            zip: "560001".to_string(),
            country: "India".to_string(),
            phone: "+91 98765 43210".to_string(),
            kind: AddressKind::Home,
            is_default: false,
        }
    }

    #[test]
    fn test_validate_ok() {
        assert_eq!(address().validate(), Ok(()));
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let mut addr = address();
        addr.city = "  ".to_string();
        assert_eq!(addr.validate(), Err("city"));
    }

    #[test]
    fn test_kind_serializes_as_type() {
        let json = serde_json::to_value(address()).expect("serialize");
        assert_eq!(json["type"], "home");
        assert_eq!(json["isDefault"], false);
    }
}
