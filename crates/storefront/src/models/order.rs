//! Order models: wire shapes for the orders API and the local receipt.

use chrono::{DateTime, Utc};
use nyraa_core::{OrderStatus, PaymentMethod, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::address::{Address, AddressKind};

/// The variant attributes that distinguish one line of the same product from
/// another: `(color, size, type, carat)`.
///
/// Also serves as the cart's uniqueness key next to the product id. `kind`
/// is serialized as `type`, the legacy field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct VariantSelection {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub carat: Option<String>,
}

impl VariantSelection {
    /// A selection with no variant attributes.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            color: None,
            size: None,
            kind: None,
            carat: None,
        }
    }

    /// Short human-readable form, e.g. `gold / M / 1.5ct`.
    #[must_use]
    pub fn label(&self) -> String {
        let mut parts = Vec::new();
        if let Some(color) = &self.color {
            parts.push(color.clone());
        }
        if let Some(size) = &self.size {
            parts.push(size.clone());
        }
        if let Some(kind) = &self.kind {
            parts.push(kind.clone());
        }
        if let Some(carat) = &self.carat {
            parts.push(format!("{carat}ct"));
        }
        parts.join(" / ")
    }
}

/// One line of an order as sent to and returned by the orders API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub product_image: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    #[serde(default)]
    pub variant: VariantSelection,
}

/// Address shape embedded in orders (no id, no default flag).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    #[serde(rename = "type", default)]
    pub kind: AddressKind,
}

impl From<&Address> for ShippingAddress {
    fn from(addr: &Address) -> Self {
        Self {
            name: addr.name.clone(),
            street: addr.street.clone(),
            city: addr.city.clone(),
            state: addr.state.clone(),
            zip: addr.zip.clone(),
            country: addr.country.clone(),
            phone: addr.phone.clone(),
            kind: addr.kind,
        }
    }
}

/// A recorded status transition on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: OrderStatus,
    #[serde(alias = "date", alias = "changedAt")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// An order as returned by the orders API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub order_number: Option<String>,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub billing_address: Option<ShippingAddress>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub special_instructions: Option<String>,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    #[serde(default)]
    pub status_history: Vec<StatusChange>,
}

/// One page of order history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Pagination envelope returned by list endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(alias = "pages")]
    pub total_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            total: 0,
            total_pages: 0,
        }
    }
}

/// Aggregate order statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_spent: Decimal,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub processing: u64,
    #[serde(default)]
    pub shipped: u64,
    #[serde(default)]
    pub delivered: u64,
    #[serde(default)]
    pub cancelled: u64,
}

/// Condensed line kept in the local receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub carat: Option<String>,
}

/// The locally persisted record of the most recent successful order.
///
/// Written on order creation for the confirmation view, replacing the legacy
/// `lastOrder` blob. Consumed (removed) once displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub id: String,
    #[serde(default)]
    pub order_number: Option<String>,
    pub items: Vec<ReceiptItem>,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub special_instructions: Option<String>,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
}
