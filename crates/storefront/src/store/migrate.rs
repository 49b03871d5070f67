//! One-time migration from the legacy unversioned state layout.
//!
//! The legacy layout is the browser local-storage dump: sibling keys
//! `token`, `userData`, `isLoggedIn`, `cart`, `wishlist`, `userAddresses`
//! and `lastOrder`, written by several frontend versions with slightly
//! different shapes. Migration is per-key best effort: a malformed key is
//! dropped with a warning instead of poisoning the whole document, because
//! v0 had no schema to validate against.

use serde_json::Value;
use tracing::warn;

use crate::cart::CartLine;
use crate::models::{Address, OrderReceipt, Session, UserProfile, VariantSelection};
use crate::wishlist::WishlistItem;

use super::{ClientState, SCHEMA_VERSION};

/// Upgrade a legacy document to the current [`ClientState`].
pub fn migrate_legacy(value: &Value) -> ClientState {
    let mut state = ClientState {
        schema_version: SCHEMA_VERSION,
        ..ClientState::default()
    };

    state.session = migrate_session(value);
    state.cart = migrate_cart(value.get("cart"));
    state.wishlist = collect(value.get("wishlist"), "wishlist");
    state.addresses = migrate_addresses(value.get("userAddresses"));
    state.last_order = value.get("lastOrder").and_then(|v| {
        parse_or_warn::<OrderReceipt>(v, "lastOrder")
    });

    state
}

/// Rebuild a session from the `token` / `userData` / `isLoggedIn` triple.
///
/// The `isLoggedIn` flag was written as the string `"true"`; it is advisory
/// only; a token plus a user record is what actually makes a session.
fn migrate_session(value: &Value) -> Option<Session> {
    let token = value.get("token")?.as_str()?.to_owned();
    if token.is_empty() {
        return None;
    }

    let user = value
        .get("userData")
        .and_then(|v| parse_or_warn::<UserProfile>(v, "userData"))?;

    Some(Session {
        token,
        user,
        logged_in_at: chrono::Utc::now(),
    })
}

/// Legacy cart lines carry the variant attributes flat on the item.
fn migrate_cart(value: Option<&Value>) -> Vec<CartLine> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let variant = VariantSelection {
                color: string_field(item, "color"),
                size: string_field(item, "size"),
                kind: string_field(item, "type"),
                carat: string_field(item, "carat"),
            };

            // Flatten-aware parse: take the scalar fields via CartLine's own
            // deserializer, then overlay the reconstructed variant.
            match serde_json::from_value::<CartLine>(item.clone()) {
                Ok(mut line) => {
                    line.variant = variant;
                    if line.quantity == 0 {
                        line.quantity = 1;
                    }
                    Some(line)
                }
                Err(e) => {
                    warn!(error = %e, "dropping unreadable legacy cart line");
                    None
                }
            }
        })
        .collect()
}

/// Addresses migrate as-is, with the at-most-one-default invariant enforced
/// (the legacy implementations disagreed on who enforced it).
fn migrate_addresses(value: Option<&Value>) -> Vec<Address> {
    let mut addresses: Vec<Address> = collect(value, "userAddresses");

    let mut seen_default = false;
    for addr in &mut addresses {
        if addr.is_default {
            if seen_default {
                addr.is_default = false;
            }
            seen_default = true;
        }
    }

    addresses
}

/// Parse every element of a legacy array, dropping unreadable entries.
fn collect<T: serde::de::DeserializeOwned>(value: Option<&Value>, key: &str) -> Vec<T> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| parse_or_warn::<T>(item, key))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_or_warn<T: serde::de::DeserializeOwned>(value: &Value, key: &str) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(key, error = %e, "dropping unreadable legacy state entry");
            None
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nyraa_core::ProductId;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_migrates_full_legacy_document() {
        let legacy = json!({
            "token": "tok-123",
            "userData": {"email": "asha@example.com", "name": "Asha"},
            "isLoggedIn": "true",
            "cart": [{
                "id": 7,
                "name": "Solitaire Ring",
                "price": 4999.0,
                "image": "ring.jpg",
                "color": "gold",
                "size": null,
                "type": "ring",
                "carat": 1.5,
                "quantity": 2,
                "addedAt": "2026-01-05T10:00:00Z"
            }],
            "wishlist": [{"id": 9, "name": "Pendant", "price": 1999.0}],
            "userAddresses": [
                {"id": 1, "name": "A", "street": "S", "city": "C", "state": "ST",
                 "zip": "1", "country": "India", "phone": "9", "isDefault": true},
                {"id": 2, "name": "B", "street": "S", "city": "C", "state": "ST",
                 "zip": "2", "country": "India", "phone": "8", "isDefault": true}
            ]
        });

        let state = migrate_legacy(&legacy);

        let session = state.session.expect("session migrated");
        assert_eq!(session.token, "tok-123");
        assert!(session.is_usable());

        assert_eq!(state.cart.len(), 1);
        let line = state.cart.first().unwrap();
        assert_eq!(line.product_id, ProductId::new(7));
        assert_eq!(line.quantity, 2);
        assert_eq!(line.variant.color.as_deref(), Some("gold"));
        assert_eq!(line.variant.kind.as_deref(), Some("ring"));
        // numeric carat becomes its string form
        assert_eq!(line.variant.carat.as_deref(), Some("1.5"));

        assert_eq!(state.wishlist.len(), 1);

        // duplicate defaults collapse to the first
        assert_eq!(state.addresses.len(), 2);
        assert!(state.addresses.first().unwrap().is_default);
        assert!(!state.addresses.get(1).unwrap().is_default);
    }

    #[test]
    fn test_empty_token_means_no_session() {
        let state = migrate_legacy(&json!({"token": "", "userData": {"email": "a@b.c"}}));
        assert!(state.session.is_none());
    }

    #[test]
    fn test_unreadable_entries_are_dropped_not_fatal() {
        let legacy = json!({
            "cart": [{"id": "not-a-number", "name": "Broken"}],
            "wishlist": "not-an-array"
        });
        let state = migrate_legacy(&legacy);
        assert!(state.cart.is_empty());
        assert!(state.wishlist.is_empty());
        assert_eq!(state.schema_version, SCHEMA_VERSION);
    }
}
