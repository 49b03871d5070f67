//! Order history: listing, filtering, cancellation, stats.

#![allow(clippy::unwrap_used)]

use nyraa_core::{OrderStatus, ProductId};
use nyraa_integration_tests::TestContext;
use nyraa_storefront::addresses::AddressBook;
use nyraa_storefront::cart::NewCartItem;
use nyraa_storefront::checkout::OrderDraft;
use nyraa_storefront::models::{Address, AddressKind, VariantSelection};
use nyraa_storefront::orders::OrderHistoryError;
use rust_decimal::Decimal;

async fn context_with_order() -> (TestContext, String) {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    let saved = ctx
        .app
        .addresses()
        .save(Address {
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
        })
        .await
        .unwrap();

    ctx.app
        .cart()
        .add(
            NewCartItem {
                product_id: ProductId::new(7),
                name: "Solitaire Ring".to_string(),
                price: "4999.00".parse::<Decimal>().unwrap(),
                image: None,
                variant: VariantSelection::none(),
            },
            1,
        )
        .unwrap();

    let receipt = ctx
        .app
        .checkout()
        .place_order(&OrderDraft::for_address(saved.id))
        .await
        .unwrap();

    (ctx, receipt.id)
}

#[tokio::test]
async fn new_orders_are_pending_and_cancellable() {
    let (ctx, order_id) = context_with_order().await;

    let order = ctx.app.orders().get(&order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    let cancelled = ctx.app.orders().cancel(&order_id, "changed my mind").await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    // The transition is recorded in the history.
    let last = cancelled.status_history.last().unwrap();
    assert_eq!(last.status, OrderStatus::Cancelled);
    assert_eq!(last.notes.as_deref(), Some("changed my mind"));
}

#[tokio::test]
async fn cancelled_orders_cannot_be_cancelled_again() {
    let (ctx, order_id) = context_with_order().await;
    ctx.app.orders().cancel(&order_id, "").await.unwrap();

    let err = ctx.app.orders().cancel(&order_id, "").await.unwrap_err();
    assert!(matches!(
        err,
        OrderHistoryError::NotCancellable {
            status: OrderStatus::Cancelled,
            ..
        }
    ));
}

#[tokio::test]
async fn listing_filters_by_status() {
    let (ctx, order_id) = context_with_order().await;
    ctx.app.orders().cancel(&order_id, "").await.unwrap();

    let cancelled = ctx
        .app
        .orders()
        .list(1, 10, Some(OrderStatus::Cancelled))
        .await
        .unwrap();
    assert_eq!(cancelled.orders.len(), 1);

    let pending = ctx
        .app
        .orders()
        .list(1, 10, Some(OrderStatus::Pending))
        .await
        .unwrap();
    assert!(pending.orders.is_empty());
}

#[tokio::test]
async fn stats_aggregate_the_account() {
    let (ctx, _order_id) = context_with_order().await;

    let stats = ctx.app.orders().stats().await.unwrap();
    assert_eq!(stats.total_orders, 1);
    assert_eq!(stats.pending, 1);
    // subtotal 4999 + shipping 10 + tax 399.92
    assert_eq!(stats.total_spent, "5408.92".parse::<Decimal>().unwrap());
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    let err = ctx.app.orders().get("ord-nope").await.unwrap_err();
    assert!(matches!(
        err,
        OrderHistoryError::Api(nyraa_storefront::api::ApiError::NotFound(_))
    ));
}
