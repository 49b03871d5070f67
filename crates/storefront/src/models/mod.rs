//! Domain models shared across the storefront services.

pub mod address;
pub mod order;
pub mod session;
pub mod user;

pub use address::{Address, AddressKind, AddressOp};
pub use order::{
    Order, OrderItem, OrderPage, OrderReceipt, OrderStats, Pagination, ReceiptItem,
    ShippingAddress, StatusChange, VariantSelection,
};
pub use session::Session;
pub use user::UserProfile;
