//! Checkout: the readiness gate and the order submission flow.
//!
//! This is the consolidation of what used to be three diverging page-level
//! copies: one gate, one validation pass, one submission path. Order creation
//! is fire-once: there is no automatic retry, and an in-flight guard makes a
//! concurrent second submission fail fast instead of double-charging.

mod gate;

pub use gate::{AuthStatus, GateOutcome, GateReport, GateState, ReadinessGate, ServerStatus};

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use nyraa_core::{AddressId, OrderStatus, PaymentMethod, price::round_money};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument};

use crate::api::types::CreateOrderRequest;
use crate::api::{ApiClient, ApiError};
use crate::auth::SessionService;
use crate::cart::{CartLine, CartService, CartTotals, Coupon};
use crate::models::{Address, OrderItem, OrderReceipt, ReceiptItem, ShippingAddress};
use crate::store::{StateError, StateStore};

/// Errors from the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The readiness gate did not pass.
    #[error("checkout blocked: {0}")]
    NotReady(GateOutcome),

    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// The draft names no shipping address.
    #[error("no shipping address selected")]
    NoAddressSelected,

    /// The selected address is not in the address book.
    #[error("address {0} not found")]
    AddressNotFound(AddressId),

    /// Credentials vanished between the gate and the submit.
    #[error("authentication required")]
    AuthRequired,

    /// Another submission is already on the wire.
    #[error("an order submission is already in flight")]
    SubmissionInFlight,

    /// Backend API error.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Client state error.
    #[error(transparent)]
    State(#[from] StateError),
}

/// Everything the user chose at checkout.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    /// Selected shipping (and billing) address.
    pub address_id: Option<AddressId>,
    pub payment_method: PaymentMethod,
    pub coupon: Option<Coupon>,
    pub special_instructions: String,
}

impl OrderDraft {
    /// Draft for an address with the default payment method.
    #[must_use]
    pub const fn for_address(address_id: AddressId) -> Self {
        Self {
            address_id: Some(address_id),
            payment_method: PaymentMethod::CreditCard,
            coupon: None,
            special_instructions: String::new(),
        }
    }
}

/// The checkout flow over the shared store and API client.
pub struct CheckoutService<'a> {
    store: &'a StateStore,
    api: &'a ApiClient,
    in_flight: &'a AtomicBool,
}

impl<'a> CheckoutService<'a> {
    /// Create a checkout service. `in_flight` must be shared by every
    /// instance that can submit for the same user (the [`crate::Storefront`]
    /// owns it).
    #[must_use]
    pub const fn new(
        store: &'a StateStore,
        api: &'a ApiClient,
        in_flight: &'a AtomicBool,
    ) -> Self {
        Self {
            store,
            api,
            in_flight,
        }
    }

    /// Run the readiness sequence.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] only if clearing a rejected session fails.
    pub async fn probe(&self) -> Result<GateReport, StateError> {
        ReadinessGate::new(self.store, self.api).probe().await
    }

    /// Totals for the current cart under the draft's coupon.
    #[must_use]
    pub fn totals(&self, draft: &OrderDraft) -> CartTotals {
        CartService::new(self.store).totals(draft.coupon.as_ref())
    }

    /// Submit the order.
    ///
    /// Validation order mirrors the gate-then-form flow: readiness, cart
    /// contents, address, then a final local credential re-check immediately
    /// before the wire. On success the cart is cleared (memory and disk) and
    /// the receipt recorded; on failure state is untouched.
    ///
    /// # Errors
    ///
    /// Each blocked precondition is its own [`CheckoutError`] variant; API
    /// failures propagate unmodified.
    #[instrument(skip(self, draft))]
    pub async fn place_order(&self, draft: &OrderDraft) -> Result<OrderReceipt, CheckoutError> {
        let _guard = InFlightGuard::acquire(self.in_flight)
            .ok_or(CheckoutError::SubmissionInFlight)?;

        let report = self.probe().await?;
        if !report.state.system_ready() {
            return Err(CheckoutError::NotReady(report.outcome));
        }

        let cart = CartService::new(self.store);
        let items = cart.items();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let address_id = draft.address_id.ok_or(CheckoutError::NoAddressSelected)?;
        let address = self
            .store
            .read(|s| s.addresses.iter().find(|a| a.id == address_id).cloned())
            .ok_or(CheckoutError::AddressNotFound(address_id))?;

        // Double-check credentials immediately before the wire.
        if !SessionService::new(self.store, self.api).is_authenticated() {
            return Err(CheckoutError::AuthRequired);
        }

        let totals = CartTotals::compute(cart.subtotal(), draft.coupon.as_ref());
        let request = build_order_request(&items, &address, draft, &totals);

        let order = self.api.create_order(&request).await?;
        info!(order_id = %order.id, total = %totals.total, "order placed");

        let receipt = build_receipt(&order.id, order.order_number.clone(), &items, &address, draft, &totals);
        self.store.mutate(|state| {
            state.cart.clear();
            state.last_order = Some(receipt.clone());
        })?;

        Ok(receipt)
    }

    /// Take the receipt of the most recent order, removing it from state.
    ///
    /// The confirmation view consumes the receipt exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the removal cannot be persisted.
    pub fn take_last_order(&self) -> Result<Option<OrderReceipt>, CheckoutError> {
        Ok(self.store.mutate(|state| state.last_order.take())?)
    }
}

/// Scale a monetary amount to exactly two decimals, the wire format.
fn money2(amount: Decimal) -> Decimal {
    let mut rounded = round_money(amount);
    rounded.rescale(2);
    rounded
}

fn build_order_request(
    items: &[CartLine],
    address: &Address,
    draft: &OrderDraft,
    totals: &CartTotals,
) -> CreateOrderRequest {
    let shipping_address = ShippingAddress::from(address);

    CreateOrderRequest {
        items: items
            .iter()
            .map(|line| OrderItem {
                product_id: line.product_id,
                product_name: line.name.clone(),
                product_image: line.image.clone(),
                quantity: line.quantity,
                unit_price: money2(line.price),
                total_price: money2(line.line_total()),
                variant: line.variant.clone(),
            })
            .collect(),
        billing_address: shipping_address.clone(),
        shipping_address,
        payment_method: draft.payment_method,
        special_instructions: draft.special_instructions.clone(),
        subtotal: money2(totals.subtotal),
        shipping: money2(totals.shipping),
        tax: money2(totals.tax),
        discount: money2(totals.discount),
        total: money2(totals.total),
    }
}

fn build_receipt(
    order_id: &str,
    order_number: Option<String>,
    items: &[CartLine],
    address: &Address,
    draft: &OrderDraft,
    totals: &CartTotals,
) -> OrderReceipt {
    OrderReceipt {
        id: order_id.to_string(),
        order_number,
        items: items
            .iter()
            .map(|line| ReceiptItem {
                id: line.product_id,
                name: line.name.clone(),
                quantity: line.quantity,
                price: money2(line.price),
                image: line.image.clone(),
                color: line.variant.color.clone(),
                carat: line.variant.carat.clone(),
            })
            .collect(),
        subtotal: money2(totals.subtotal),
        shipping: money2(totals.shipping),
        tax: money2(totals.tax),
        discount: money2(totals.discount),
        total: money2(totals.total),
        shipping_address: ShippingAddress::from(address),
        special_instructions: if draft.special_instructions.is_empty() {
            None
        } else {
            Some(draft.special_instructions.clone())
        },
        order_date: Utc::now(),
        status: OrderStatus::Pending,
        payment_method: draft.payment_method,
    }
}

/// RAII flag marking a submission on the wire. Acquire fails if one is
/// already held; drop releases.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
