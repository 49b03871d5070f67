//! Address book: online sync, offline journaling, and reconciliation.

#![allow(clippy::unwrap_used)]

use nyraa_integration_tests::TestContext;
use nyraa_storefront::addresses::{AddressBook, SyncMode};
use nyraa_storefront::models::{Address, AddressKind};

fn address(name: &str, is_default: bool) -> Address {
    Address {
        id: AddressBook::mint_id(),
        name: name.to_string(),
        street: "12 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        zip: "560001".to_string(),
        country: "India".to_string(),
        phone: "+91 98765 43210".to_string(),
        kind: AddressKind::Home,
        is_default,
    }
}

#[tokio::test]
async fn online_writes_reach_the_server() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    let book = ctx.app.addresses();
    let saved = book.save(address("Asha Rao", true)).await.unwrap();

    assert_eq!(book.mode(), SyncMode::Online);
    assert_eq!(ctx.backend.addresses.lock().unwrap().len(), 1);

    book.delete(saved.id).await.unwrap();
    assert!(ctx.backend.addresses.lock().unwrap().is_empty());
}

#[tokio::test]
async fn default_is_exclusive_locally_and_remotely() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    let book = ctx.app.addresses();
    let first = book.save(address("First", true)).await.unwrap();
    let second = book.save(address("Second", false)).await.unwrap();

    book.set_default(second.id).await.unwrap();

    let local = book.local();
    let defaults: Vec<_> = local.iter().filter(|a| a.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults.first().unwrap().id, second.id);
    assert_ne!(first.id, second.id);

    let remote = ctx.backend.addresses.lock().unwrap();
    assert_eq!(remote.iter().filter(|a| a.is_default).count(), 1);
}

#[tokio::test]
async fn unreachable_server_journals_writes_and_serves_local_reads() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    // Same state file, but pointed at a dead port.
    let offline = ctx.storefront_at(TestContext::unreachable_url().await);
    let book = offline.addresses();

    let saved = book.save(address("Offline Entry", true)).await.unwrap();
    assert_eq!(book.mode(), SyncMode::Offline);

    // Reads keep working from the local copy.
    let listed = book.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed.first().unwrap().id, saved.id);

    // Nothing reached the backend.
    assert!(ctx.backend.addresses.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reconcile_replays_the_journal_and_adopts_server_state() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    // Go offline and accumulate changes.
    let offline = ctx.storefront_at(TestContext::unreachable_url().await);
    let book = offline.addresses();
    let kept = book.save(address("Kept", true)).await.unwrap();
    let dropped = book.save(address("Dropped", false)).await.unwrap();
    book.delete(dropped.id).await.unwrap();
    assert_eq!(book.mode(), SyncMode::Offline);

    // Back online (fresh client over the same state file).
    let online = ctx.storefront_at(ctx.base_url.clone());
    let book = online.addresses();
    let report = book.reconcile().await.unwrap();

    assert!(report.dropped.is_empty());
    assert_eq!(book.mode(), SyncMode::Online);

    let remote = ctx.backend.addresses.lock().unwrap();
    assert_eq!(remote.len(), 1);
    assert_eq!(remote.first().unwrap().name, "Kept");
    assert_eq!(remote.first().unwrap().id, kept.id);

    drop(remote);
    let local = book.local();
    assert_eq!(local.len(), 1);
    assert_eq!(local.first().unwrap().name, "Kept");
}

#[tokio::test]
async fn reconcile_against_a_dead_server_keeps_the_journal() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    let offline = ctx.storefront_at(TestContext::unreachable_url().await);
    let book = offline.addresses();
    book.save(address("Waiting", false)).await.unwrap();

    let err = book.reconcile().await.unwrap_err();
    assert!(matches!(
        err,
        nyraa_storefront::addresses::AddressError::Api(e) if e.is_unreachable()
    ));

    // The journal survives for a later, reachable reconcile.
    assert_eq!(book.mode(), SyncMode::Offline);
}
