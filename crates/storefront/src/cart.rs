//! Cart service: variant-keyed line items persisted through the state store.
//!
//! A line is keyed by `(product_id, variant)`: the same product in a
//! different color, size, type, or carat is a distinct line. Every mutation
//! is written through to disk, so the cart survives process restarts the way
//! the browser cart survived reloads.

use chrono::{DateTime, Utc};
use nyraa_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::VariantSelection;
use crate::store::{StateError, StateStore};

/// Flat shipping charge applied to any non-empty cart.
pub const SHIPPING_FLAT: Decimal = Decimal::from_parts(1000, 0, 0, false, 2); // 10.00

/// Tax rate applied to the subtotal.
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2); // 0.08

/// Discount rate granted by the one supported coupon.
const SAVE10_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2); // 0.10

fn default_quantity() -> u32 {
    1
}

fn default_added_at() -> DateTime<Utc> {
    Utc::now()
}

/// One cart line.
///
/// Serde accepts the legacy flat cart-item shape (`id`, `addedAt`, missing
/// `variant`) so state migration can reuse this deserializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(alias = "id")]
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub variant: VariantSelection,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default = "default_added_at")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Line total: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    fn matches(&self, product_id: ProductId, variant: &VariantSelection) -> bool {
        self.product_id == product_id && self.variant == *variant
    }
}

/// Input for adding a product to the cart.
#[derive(Debug, Clone)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub variant: VariantSelection,
}

/// Coupon errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    /// The code is not recognized; any applied discount resets to zero.
    #[error("invalid coupon code: {0}")]
    Invalid(String),
}

/// A validated coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    code: String,
    rate: Decimal,
}

impl Coupon {
    /// Validate a coupon code. `SAVE10` (case-insensitive) grants 10% off;
    /// everything else is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Invalid`] for unrecognized codes.
    pub fn parse(code: &str) -> Result<Self, CouponError> {
        let trimmed = code.trim();
        if trimmed.eq_ignore_ascii_case("SAVE10") {
            Ok(Self {
                code: trimmed.to_ascii_uppercase(),
                rate: SAVE10_RATE,
            })
        } else {
            Err(CouponError::Invalid(trimmed.to_string()))
        }
    }

    /// The normalized coupon code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Discount rate as a fraction of the subtotal.
    #[must_use]
    pub const fn rate(&self) -> Decimal {
        self.rate
    }
}

/// Computed checkout totals, each component rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    /// `total = subtotal + shipping + 8% tax - coupon discount`.
    ///
    /// Shipping is waived for an empty cart (a zero subtotal).
    #[must_use]
    pub fn compute(subtotal: Decimal, coupon: Option<&Coupon>) -> Self {
        let subtotal = nyraa_core::price::round_money(subtotal);
        let shipping = if subtotal.is_zero() {
            Decimal::ZERO
        } else {
            SHIPPING_FLAT
        };
        let tax = nyraa_core::price::round_money(subtotal * TAX_RATE);
        let discount = coupon.map_or(Decimal::ZERO, |c| {
            nyraa_core::price::round_money(subtotal * c.rate())
        });
        let total = nyraa_core::price::round_money(subtotal + shipping + tax - discount);

        Self {
            subtotal,
            shipping,
            tax,
            discount,
            total,
        }
    }
}

/// Cart operations over the state store.
pub struct CartService<'a> {
    store: &'a StateStore,
}

impl<'a> CartService<'a> {
    /// Create a cart service over the shared state store.
    #[must_use]
    pub const fn new(store: &'a StateStore) -> Self {
        Self { store }
    }

    /// Add a product to the cart.
    ///
    /// An existing line with the same `(product_id, variant)` has its
    /// quantity incremented; otherwise a new line is appended. A zero
    /// quantity is treated as one.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the cart cannot be persisted.
    pub fn add(&self, item: NewCartItem, quantity: u32) -> Result<(), StateError> {
        let quantity = quantity.max(1);
        self.store.mutate(|state| {
            if let Some(line) = state
                .cart
                .iter_mut()
                .find(|l| l.matches(item.product_id, &item.variant))
            {
                line.quantity += quantity;
                debug!(product = %item.product_id, quantity = line.quantity, "cart line incremented");
            } else {
                debug!(product = %item.product_id, "cart line added");
                state.cart.push(CartLine {
                    product_id: item.product_id,
                    name: item.name,
                    price: item.price,
                    image: item.image,
                    variant: item.variant,
                    quantity,
                    added_at: Utc::now(),
                });
            }
        })
    }

    /// Remove an entire line from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the cart cannot be persisted.
    pub fn remove_line(
        &self,
        product_id: ProductId,
        variant: &VariantSelection,
    ) -> Result<(), StateError> {
        self.store
            .mutate(|state| state.cart.retain(|l| !l.matches(product_id, variant)))
    }

    /// Set the quantity of a line. Zero removes the line (removing the last
    /// unit removes the line entirely).
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the cart cannot be persisted.
    pub fn set_quantity(
        &self,
        product_id: ProductId,
        variant: &VariantSelection,
        quantity: u32,
    ) -> Result<(), StateError> {
        self.store.mutate(|state| {
            if quantity == 0 {
                state.cart.retain(|l| !l.matches(product_id, variant));
            } else if let Some(line) = state
                .cart
                .iter_mut()
                .find(|l| l.matches(product_id, variant))
            {
                line.quantity = quantity;
            }
        })
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the cart cannot be persisted.
    pub fn clear(&self) -> Result<(), StateError> {
        self.store.mutate(|state| state.cart.clear())
    }

    /// Snapshot of the current lines.
    #[must_use]
    pub fn items(&self) -> Vec<CartLine> {
        self.store.read(|state| state.cart.clone())
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.store
            .read(|state| state.cart.iter().map(|l| l.quantity).sum())
    }

    /// Sum of line totals, unrounded.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.store
            .read(|state| state.cart.iter().map(CartLine::line_total).sum())
    }

    /// Totals for the current cart contents under an optional coupon.
    #[must_use]
    pub fn totals(&self, coupon: Option<&Coupon>) -> CartTotals {
        CartTotals::compute(self.subtotal(), coupon)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn store() -> (tempfile::TempDir, StateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::open(dir.path().join("state.json")).unwrap();
        (dir, store)
    }

    fn ring(color: &str) -> NewCartItem {
        NewCartItem {
            product_id: ProductId::new(7),
            name: "Solitaire Ring".to_string(),
            price: dec("4999.00"),
            image: None,
            variant: VariantSelection {
                color: Some(color.to_string()),
                size: None,
                kind: Some("ring".to_string()),
                carat: Some("1.5".to_string()),
            },
        }
    }

    #[test]
    fn test_same_variant_increments_quantity() {
        let (_dir, store) = store();
        let cart = CartService::new(&store);

        cart.add(ring("gold"), 1).unwrap();
        cart.add(ring("gold"), 2).unwrap();

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().quantity, 3);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_different_variant_is_a_distinct_line() {
        let (_dir, store) = store();
        let cart = CartService::new(&store);

        cart.add(ring("gold"), 1).unwrap();
        cart.add(ring("silver"), 1).unwrap();

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_zero_quantity_removes_the_line() {
        let (_dir, store) = store();
        let cart = CartService::new(&store);

        let item = ring("gold");
        let variant = item.variant.clone();
        cart.add(item, 1).unwrap();
        cart.set_quantity(ProductId::new(7), &variant, 0).unwrap();

        assert!(cart.items().is_empty());
    }

    #[test]
    fn test_remove_line_removes_only_that_variant() {
        let (_dir, store) = store();
        let cart = CartService::new(&store);

        let gold = ring("gold");
        let gold_variant = gold.variant.clone();
        cart.add(gold, 1).unwrap();
        cart.add(ring("silver"), 1).unwrap();

        cart.remove_line(ProductId::new(7), &gold_variant).unwrap();

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(
            items.first().unwrap().variant.color.as_deref(),
            Some("silver")
        );
    }

    #[test]
    fn test_clear_empties_cart() {
        let (_dir, store) = store();
        let cart = CartService::new(&store);

        cart.add(ring("gold"), 2).unwrap();
        cart.clear().unwrap();

        assert!(cart.items().is_empty());
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn test_coupon_save10_any_case() {
        assert!(Coupon::parse("SAVE10").is_ok());
        assert!(Coupon::parse("save10").is_ok());
        assert!(Coupon::parse(" Save10 ").is_ok());
        assert_eq!(Coupon::parse("save10").unwrap().rate(), dec("0.10"));
        assert_eq!(
            Coupon::parse("SAVE20"),
            Err(CouponError::Invalid("SAVE20".to_string()))
        );
    }

    #[test]
    fn test_totals_formula() {
        // subtotal 100 → shipping 10, tax 8, discount 10, total 108
        let coupon = Coupon::parse("SAVE10").unwrap();
        let totals = CartTotals::compute(dec("100.00"), Some(&coupon));
        assert_eq!(totals.shipping, dec("10.00"));
        assert_eq!(totals.tax, dec("8.00"));
        assert_eq!(totals.discount, dec("10.00"));
        assert_eq!(totals.total, dec("108.00"));
    }

    #[test]
    fn test_totals_without_coupon() {
        let totals = CartTotals::compute(dec("59.99"), None);
        assert_eq!(totals.discount, Decimal::ZERO);
        // 59.99 + 10.00 + 4.80 (rounded from 4.7992)
        assert_eq!(totals.tax, dec("4.80"));
        assert_eq!(totals.total, dec("74.79"));
    }

    #[test]
    fn test_empty_cart_waives_shipping() {
        let totals = CartTotals::compute(Decimal::ZERO, None);
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }
}
