//! CLI subcommand implementations.

pub mod address;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod wishlist;

use nyraa_core::{CurrencyCode, Price};
use rust_decimal::Decimal;

/// Format a monetary amount in the store currency.
pub(crate) fn money(amount: Decimal) -> Price {
    Price::new(amount, CurrencyCode::INR)
}
