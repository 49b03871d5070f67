//! Wire types for the backend REST API.
//!
//! Response envelopes follow the backend convention of a `success` flag next
//! to the payload key; request bodies are the exact shapes the legacy
//! frontend sends, monetary fields as 2-decimal strings.

use nyraa_core::{Email, OrderStatus, PaymentMethod};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Address, Order, OrderItem, OrderStats, Pagination, ShippingAddress, UserProfile};

fn success_default() -> bool {
    true
}

// =============================================================================
// Health
// =============================================================================

/// Body of `GET /api/health`. Reachability is decided by the HTTP status;
/// these fields are informational.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Serialize)]
pub struct SendOtpRequest<'a> {
    pub email: &'a Email,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpRequest<'a> {
    pub email: &'a Email,
    pub otp: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PasswordLoginRequest<'a> {
    pub email: &'a Email,
    pub password: &'a str,
}

/// Google sign-in: the ID token from the OAuth widget, verified server-side.
#[derive(Debug, Serialize)]
pub struct GoogleLoginRequest<'a> {
    pub credential: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ForgotPasswordRequest<'a> {
    pub email: &'a Email,
}

/// Token-issuing response shared by the login endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default = "success_default")]
    pub success: bool,
    pub token: String,
    pub user: UserProfile,
    #[serde(default)]
    pub message: Option<String>,
}

/// Envelope of `GET /api/auth/profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileEnvelope {
    #[serde(default = "success_default")]
    pub success: bool,
    pub user: UserProfile,
}

/// Plain acknowledgement envelope (send-otp, forgot-password, deletes).
#[derive(Debug, Clone, Deserialize)]
pub struct AckEnvelope {
    #[serde(default = "success_default")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Orders
// =============================================================================

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    /// Same address as shipping; the storefront has no separate billing step.
    pub billing_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub special_instructions: String,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// Envelope of `POST /api/orders` and `GET /api/orders/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderEnvelope {
    #[serde(default = "success_default")]
    pub success: bool,
    pub order: Option<Order>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Envelope of `GET /api/orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersEnvelope {
    #[serde(default = "success_default")]
    pub success: bool,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `PATCH /api/orders/{id}/status`.
#[derive(Debug, Serialize)]
pub struct UpdateOrderStatusRequest<'a> {
    pub status: OrderStatus,
    pub notes: &'a str,
}

/// Envelope of `GET /api/orders/stats`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsEnvelope {
    #[serde(default = "success_default")]
    pub success: bool,
    #[serde(default)]
    pub stats: OrderStats,
}

// =============================================================================
// Addresses
// =============================================================================

/// Envelope of `GET /api/user/addresses`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressesEnvelope {
    #[serde(default = "success_default")]
    pub success: bool,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

/// Envelope of address create/update.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressEnvelope {
    #[serde(default = "success_default")]
    pub success: bool,
    pub address: Option<Address>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body shape: the backend reports failures as `{ "message": ... }`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_request_money_as_strings() {
        let req = CreateOrderRequest {
            items: Vec::new(),
            shipping_address: sample_address(),
            billing_address: sample_address(),
            payment_method: PaymentMethod::CreditCard,
            special_instructions: String::new(),
            subtotal: "100.00".parse().expect("decimal"),
            shipping: "10.00".parse().expect("decimal"),
            tax: "8.00".parse().expect("decimal"),
            discount: "0.00".parse().expect("decimal"),
            total: "118.00".parse().expect("decimal"),
        };

        let json = serde_json::to_value(&req).expect("serialize");
        assert_eq!(json["subtotal"], "100.00");
        assert_eq!(json["total"], "118.00");
        assert_eq!(json["paymentMethod"], "creditCard");
        assert_eq!(json["billingAddress"]["type"], "home");
    }

    fn sample_address() -> ShippingAddress {
        ShippingAddress {
            name: "A".to_string(),
            street: "S".to_string(),
            city: "C".to_string(),
            state: "ST".to_string(),
            zip: "1".to_string(),
            country: "India".to_string(),
            phone: "9".to_string(),
            kind: crate::models::AddressKind::Home,
        }
    }
}
