//! Status enums for orders and payments.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// The legacy frontend shipped two parallel spellings (`pending` and
/// `Pending`); this enum is the single source of truth. The wire form is
/// lowercase, and deserialization tolerates the capitalized legacy variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Processing")]
    Processing,
    #[serde(alias = "Shipped")]
    Shipped,
    #[serde(alias = "Delivered")]
    Delivered,
    #[serde(alias = "Cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// Whether a customer may still cancel an order in this status.
    ///
    /// Matches the storefront rule: only orders that have not shipped.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    /// Whether this status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment method selected at checkout.
///
/// Wire names are the camelCase strings the order API expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    DebitCard,
    Upi,
    CashOnDelivery,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreditCard => write!(f, "creditCard"),
            Self::DebitCard => write!(f, "debitCard"),
            Self::Upi => write!(f, "upi"),
            Self::CashOnDelivery => write!(f, "cashOnDelivery"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "creditCard" | "credit-card" => Ok(Self::CreditCard),
            "debitCard" | "debit-card" => Ok(Self::DebitCard),
            "upi" => Ok(Self::Upi),
            "cashOnDelivery" | "cash-on-delivery" | "cod" => Ok(Self::CashOnDelivery),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_accepts_both_casings() {
        let lower: OrderStatus = serde_json::from_str("\"pending\"").expect("lowercase");
        let upper: OrderStatus = serde_json::from_str("\"Pending\"").expect("capitalized");
        assert_eq!(lower, OrderStatus::Pending);
        assert_eq!(upper, OrderStatus::Pending);
    }

    #[test]
    fn test_order_status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Shipped).expect("serialize");
        assert_eq!(json, "\"shipped\"");
    }

    #[test]
    fn test_cancellable() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Processing.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert!(!OrderStatus::Delivered.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn test_payment_method_wire_names() {
        let json = serde_json::to_string(&PaymentMethod::CashOnDelivery).expect("serialize");
        assert_eq!(json, "\"cashOnDelivery\"");
        let back: PaymentMethod = serde_json::from_str("\"creditCard\"").expect("deserialize");
        assert_eq!(back, PaymentMethod::CreditCard);
    }

    #[test]
    fn test_status_from_str_case_insensitive() {
        assert_eq!("Cancelled".parse::<OrderStatus>(), Ok(OrderStatus::Cancelled));
        assert_eq!("shipped".parse::<OrderStatus>(), Ok(OrderStatus::Shipped));
        assert!("unknown".parse::<OrderStatus>().is_err());
    }
}
