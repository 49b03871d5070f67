//! Wishlist: an id-deduplicated saved-products list.

use chrono::{DateTime, Utc};
use nyraa_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::{StateError, StateStore};

/// A saved product. Adding an id that is already present is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
}

/// Wishlist operations over the state store.
pub struct WishlistService<'a> {
    store: &'a StateStore,
}

impl<'a> WishlistService<'a> {
    #[must_use]
    pub const fn new(store: &'a StateStore) -> Self {
        Self { store }
    }

    /// Save a product. Duplicate ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the wishlist cannot be persisted.
    pub fn add(&self, item: WishlistItem) -> Result<(), StateError> {
        self.store.mutate(|state| {
            if !state.wishlist.iter().any(|i| i.id == item.id) {
                state.wishlist.push(item);
            }
        })
    }

    /// Remove a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the wishlist cannot be persisted.
    pub fn remove(&self, id: ProductId) -> Result<(), StateError> {
        self.store.mutate(|state| state.wishlist.retain(|i| i.id != id))
    }

    /// Whether a product is saved.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.store.read(|state| state.wishlist.iter().any(|i| i.id == id))
    }

    /// Snapshot of the saved products.
    #[must_use]
    pub fn items(&self) -> Vec<WishlistItem> {
        self.store.read(|state| state.wishlist.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i64) -> WishlistItem {
        WishlistItem {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Decimal::ZERO,
            image: None,
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_deduplicates_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::open(dir.path().join("state.json")).unwrap();
        let wishlist = WishlistService::new(&store);

        wishlist.add(item(1)).unwrap();
        wishlist.add(item(1)).unwrap();
        wishlist.add(item(2)).unwrap();

        assert_eq!(wishlist.items().len(), 2);
        assert!(wishlist.contains(ProductId::new(1)));
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::open(dir.path().join("state.json")).unwrap();
        let wishlist = WishlistService::new(&store);

        wishlist.add(item(1)).unwrap();
        wishlist.remove(ProductId::new(1)).unwrap();

        assert!(!wishlist.contains(ProductId::new(1)));
        assert!(wishlist.items().is_empty());
    }
}
