//! Rollback and call ordering when the saved-items backend fails or stalls.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use bramble_core::{ProductId, ShopperKey};
use bramble_integration_tests::{FlakyBackend, HeldSaves, ids, item};
use bramble_storefront::backend::BackendError;
use bramble_storefront::cart::{CartError, CartStore};
use bramble_storefront::session::SessionRegistry;

fn store(backend: &Arc<FlakyBackend>) -> CartStore<FlakyBackend> {
    CartStore::new(ShopperKey::new("flaky"), Arc::clone(backend))
}

fn id(value: &str) -> ProductId {
    ProductId::new(value)
}

#[tokio::test]
async fn test_save_for_later_rolls_back() {
    let backend = FlakyBackend::new();
    let store = store(&backend);
    for product in ["a", "b", "c"] {
        store.add_item(item(product, 100)).await.unwrap();
    }

    backend.set_failing(true);
    let err = store.save_for_later(&id("b")).await.unwrap_err();

    match err {
        CartError::Remote { id, source } => {
            assert_eq!(id.as_str(), "b");
            assert!(matches!(source, BackendError::Unavailable(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(ids(&store.items()), ["a", "b", "c"]);
    assert!(store.saved_items().is_empty());
    assert!(backend.stored(store.shopper()).is_empty());
}

#[tokio::test]
async fn test_move_to_cart_rolls_back() {
    let backend = FlakyBackend::new();
    let store = store(&backend);
    store.add_item(item("a", 100)).await.unwrap();
    store.add_item(item("b", 100)).await.unwrap();
    store.save_for_later(&id("a")).await.unwrap();
    store.save_for_later(&id("b")).await.unwrap();

    backend.set_failing(true);
    assert!(store.move_to_cart(&id("a")).await.is_err());

    assert!(store.items().is_empty());
    assert_eq!(ids(&store.saved_items()), ["a", "b"]);
}

#[tokio::test]
async fn test_remove_saved_rolls_back() {
    let backend = FlakyBackend::new();
    let store = store(&backend);
    store.add_item(item("a", 100)).await.unwrap();
    store.save_for_later(&id("a")).await.unwrap();

    backend.set_failing(true);
    assert!(store.remove_saved_item(&id("a")).await.is_err());
    assert_eq!(ids(&store.saved_items()), ["a"]);

    backend.set_failing(false);
    assert!(store.remove_saved_item(&id("a")).await.unwrap());
    assert!(store.saved_items().is_empty());
    assert!(backend.stored(store.shopper()).is_empty());
}

#[tokio::test]
async fn test_store_recovers_after_outage() {
    let backend = FlakyBackend::new();
    let store = store(&backend);
    store.add_item(item("a", 250)).await.unwrap();

    backend.set_failing(true);
    assert!(store.save_for_later(&id("a")).await.is_err());

    backend.set_failing(false);
    store.save_for_later(&id("a")).await.unwrap();
    assert_eq!(ids(&store.saved_items()), ["a"]);
    assert_eq!(ids(&backend.stored(store.shopper())), ["a"]);
}

#[tokio::test]
async fn test_reclaim_tolerates_backend_failure() {
    let backend = FlakyBackend::new();
    let store = store(&backend);
    store.add_item(item("a", 100)).await.unwrap();
    store.save_for_later(&id("a")).await.unwrap();

    backend.set_failing(true);
    store.add_item(item("a", 100)).await.unwrap();

    assert_eq!(store.items()[0].quantity.get(), 2);
    assert!(store.saved_items().is_empty());
}

#[tokio::test]
async fn test_active_cart_needs_no_backend() {
    let backend = FlakyBackend::new();
    backend.set_failing(true);
    let store = store(&backend);

    store.add_item(item("a", 100)).await.unwrap();
    store.update_quantity(&id("a"), 5).unwrap();
    store.remove_item(&id("a")).unwrap();
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_session_starts_empty_when_restore_fails() {
    let backend = FlakyBackend::new();
    backend.set_failing(true);
    let registry = SessionRegistry::new(Arc::clone(&backend), 10, Duration::from_secs(60));

    let session = registry.get_or_create(&ShopperKey::new("offline")).await;
    assert!(session.cart().saved_items().is_empty());
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_slow_save_cannot_outlive_a_later_move() {
    let backend = HeldSaves::new();
    let shopper = ShopperKey::new("impatient");
    let store = Arc::new(CartStore::new(shopper.clone(), Arc::clone(&backend)));
    store.add_item(item("a", 100)).await.unwrap();

    let saving = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.save_for_later(&id("a")).await }
    });
    backend.wait_for_saves(1).await;

    let moving = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.move_to_cart(&id("a")).await }
    });
    tokio::task::yield_now().await;
    backend.release(1);

    saving.await.unwrap().unwrap();
    moving.await.unwrap().unwrap();
    assert_eq!(ids(&store.items()), ["a"]);
    assert!(backend.stored(&shopper).is_empty());

    let registry = SessionRegistry::new(Arc::clone(&backend), 10, Duration::from_secs(60));
    let next_visit = registry.get_or_create(&shopper).await;
    assert!(next_visit.cart().saved_items().is_empty());
}
