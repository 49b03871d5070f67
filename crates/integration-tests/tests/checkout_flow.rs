//! Order submission: validation, success effects, and failure semantics.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;

use nyraa_core::{AddressId, ProductId};
use nyraa_integration_tests::TestContext;
use nyraa_storefront::addresses::AddressBook;
use nyraa_storefront::cart::NewCartItem;
use nyraa_storefront::checkout::{CheckoutError, GateOutcome, OrderDraft};
use nyraa_storefront::models::{Address, AddressKind, VariantSelection};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn ring() -> NewCartItem {
    NewCartItem {
        product_id: ProductId::new(7),
        name: "Solitaire Ring".to_string(),
        price: dec("4999.00"),
        image: Some("ring.jpg".to_string()),
        variant: VariantSelection {
            color: Some("gold".to_string()),
            size: None,
            kind: Some("ring".to_string()),
            carat: Some("1.5".to_string()),
        },
    }
}

fn home_address() -> Address {
    Address {
        id: AddressBook::mint_id(),
        name: "Asha Rao".to_string(),
        street: "12 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        zip: "560001".to_string(),
        country: "India".to_string(),
        phone: "+91 98765 43210".to_string(),
        kind: AddressKind::Home,
        is_default: true,
    }
}

async fn ready_context() -> (TestContext, AddressId) {
    let ctx = TestContext::spawn().await;
    ctx.login().await;
    let saved = ctx.app.addresses().save(home_address()).await.unwrap();
    (ctx, saved.id)
}

#[tokio::test]
async fn empty_cart_blocks_submission() {
    let (ctx, address_id) = ready_context().await;

    let err = ctx
        .app
        .checkout()
        .place_order(&OrderDraft::for_address(address_id))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::EmptyCart));
    assert_eq!(ctx.backend.order_count(), 0);
}

#[tokio::test]
async fn missing_address_blocks_submission() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;
    ctx.app.cart().add(ring(), 1).unwrap();

    let draft = OrderDraft {
        address_id: None,
        ..OrderDraft::for_address(AddressId::new(0))
    };
    let err = ctx.app.checkout().place_order(&draft).await.unwrap_err();
    assert!(matches!(err, CheckoutError::NoAddressSelected));

    let unknown = OrderDraft::for_address(AddressId::new(424_242));
    let err = ctx.app.checkout().place_order(&unknown).await.unwrap_err();
    assert!(matches!(err, CheckoutError::AddressNotFound(_)));

    assert_eq!(ctx.backend.order_count(), 0);
}

#[tokio::test]
async fn not_logged_in_blocks_submission() {
    let ctx = TestContext::spawn().await;
    ctx.app.cart().add(ring(), 1).unwrap();

    let err = ctx
        .app
        .checkout()
        .place_order(&OrderDraft::for_address(AddressId::new(1)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::NotReady(GateOutcome::LoginRequired)
    ));
    assert_eq!(ctx.backend.order_count(), 0);
}

#[tokio::test]
async fn successful_order_clears_cart_and_records_receipt() {
    let (ctx, address_id) = ready_context().await;
    ctx.app.cart().add(ring(), 2).unwrap();

    let receipt = ctx
        .app
        .checkout()
        .place_order(&OrderDraft::for_address(address_id))
        .await
        .unwrap();

    // subtotal 9998, shipping 10, tax 799.84, total 10807.84
    assert_eq!(receipt.subtotal, dec("9998.00"));
    assert_eq!(receipt.total, dec("10807.84"));
    assert_eq!(receipt.shipping_address.city, "Bengaluru");

    // Cart cleared in memory and on disk.
    assert!(ctx.app.cart().items().is_empty());
    let reopened = ctx.storefront_at(ctx.base_url.clone());
    assert!(reopened.cart().items().is_empty());

    // Backend has the order; the receipt is consumed exactly once.
    assert_eq!(ctx.backend.order_count(), 1);
    let receipt = ctx.app.checkout().take_last_order().unwrap();
    assert!(receipt.is_some());
    assert!(ctx.app.checkout().take_last_order().unwrap().is_none());
}

#[tokio::test]
async fn submitted_order_appears_in_history() {
    let (ctx, address_id) = ready_context().await;
    ctx.app.cart().add(ring(), 1).unwrap();

    let receipt = ctx
        .app
        .checkout()
        .place_order(&OrderDraft::for_address(address_id))
        .await
        .unwrap();

    let page = ctx.app.orders().list(1, 10, None).await.unwrap();
    assert_eq!(page.orders.len(), 1);
    let order = page.orders.first().unwrap();
    assert_eq!(order.id, receipt.id);
    assert_eq!(order.total, receipt.total);
    assert_eq!(order.items.first().unwrap().variant.kind.as_deref(), Some("ring"));
}

#[tokio::test]
async fn failed_submission_leaves_cart_intact() {
    let (ctx, address_id) = ready_context().await;
    ctx.app.cart().add(ring(), 1).unwrap();
    ctx.backend.fail_orders.store(true, Ordering::Relaxed);

    let err = ctx
        .app
        .checkout()
        .place_order(&OrderDraft::for_address(address_id))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Api(_)));
    assert_eq!(ctx.app.cart().items().len(), 1);
    assert!(ctx.app.checkout().take_last_order().unwrap().is_none());

    // No automatic retry happened: exactly zero orders were accepted.
    assert_eq!(ctx.backend.order_count(), 0);
}

#[tokio::test]
async fn concurrent_submissions_fail_fast() {
    let (ctx, address_id) = ready_context().await;
    ctx.app.cart().add(ring(), 1).unwrap();

    let draft = OrderDraft::for_address(address_id);
    let checkout_a = ctx.app.checkout();
    let checkout_b = ctx.app.checkout();

    let (a, b) = tokio::join!(checkout_a.place_order(&draft), checkout_b.place_order(&draft));

    // Exactly one submission reached the backend; the other failed fast.
    let in_flight = |r: &Result<_, CheckoutError>| {
        matches!(r, Err(CheckoutError::SubmissionInFlight))
    };
    assert!(a.is_ok() ^ b.is_ok(), "exactly one submission should win");
    assert!(in_flight(&a) || in_flight(&b));
    assert_eq!(ctx.backend.order_count(), 1);
}

#[tokio::test]
async fn coupon_discounts_the_order() {
    let (ctx, address_id) = ready_context().await;
    ctx.app.cart().add(ring(), 2).unwrap();

    let mut draft = OrderDraft::for_address(address_id);
    draft.coupon = Some(nyraa_storefront::cart::Coupon::parse("save10").unwrap());

    let receipt = ctx.app.checkout().place_order(&draft).await.unwrap();

    // subtotal 9998, shipping 10, tax 799.84, discount 999.80
    assert_eq!(receipt.discount, dec("999.80"));
    assert_eq!(receipt.total, dec("9808.04"));
}
