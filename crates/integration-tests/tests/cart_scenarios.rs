//! Cart store behavior through whole shopping flows.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use bramble_core::{MAX_UNIT_PRICE, NewCartItem, ProductId, ShopperKey};
use bramble_integration_tests::{ids, item};
use bramble_storefront::backend::InMemorySavedItems;
use bramble_storefront::cart::{AddOutcome, CartError, CartStore};
use rust_decimal::Decimal;

fn store() -> (CartStore<InMemorySavedItems>, Arc<InMemorySavedItems>) {
    let backend = Arc::new(InMemorySavedItems::new());
    let store = CartStore::new(ShopperKey::new("scenario"), Arc::clone(&backend));
    (store, backend)
}

fn id(value: &str) -> ProductId {
    ProductId::new(value)
}

/// No id may sit in both lists.
fn assert_exclusive(store: &CartStore<InMemorySavedItems>) {
    let snapshot = store.snapshot().unwrap();
    for line in &snapshot.items {
        assert!(
            snapshot.saved_items.iter().all(|saved| saved.id != line.id),
            "{} is both active and saved",
            line.id
        );
    }
}

#[tokio::test]
async fn test_add_save_move_walkthrough() {
    let (store, backend) = store();

    store.add_item(item("A", 1_000)).await.unwrap();
    let snapshot = store.snapshot().unwrap();
    assert_eq!(ids(&snapshot.items), ["A"]);
    assert_eq!(snapshot.items[0].quantity.get(), 1);
    assert_eq!(snapshot.total, "10.00");

    store.add_item(item("A", 1_000)).await.unwrap();
    let snapshot = store.snapshot().unwrap();
    assert_eq!(ids(&snapshot.items), ["A"]);
    assert_eq!(snapshot.items[0].quantity.get(), 2);
    assert_eq!(snapshot.total, "20.00");

    store.save_for_later(&id("A")).await.unwrap();
    let snapshot = store.snapshot().unwrap();
    assert!(snapshot.items.is_empty());
    assert_eq!(ids(&snapshot.saved_items), ["A"]);
    assert_eq!(snapshot.saved_items[0].quantity.get(), 2);
    assert_eq!(snapshot.total, "0.00");
    assert_eq!(ids(&backend.stored(store.shopper())), ["A"]);

    store.move_to_cart(&id("A")).await.unwrap();
    let snapshot = store.snapshot().unwrap();
    assert_eq!(ids(&snapshot.items), ["A"]);
    assert_eq!(snapshot.items[0].quantity.get(), 2);
    assert!(snapshot.saved_items.is_empty());
    assert!(backend.stored(store.shopper()).is_empty());
}

#[tokio::test]
async fn test_repeated_adds_count_calls() {
    let (store, _) = store();
    for _ in 0..7 {
        store.add_item(item("sock", 650)).await.unwrap();
    }

    let items = store.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity.get(), 7);
    assert_eq!(store.total().unwrap(), "45.50");
}

#[tokio::test]
async fn test_remove_twice_is_noop() {
    let (store, _) = store();
    store.add_item(item("hat", 2_000)).await.unwrap();

    assert!(store.remove_item(&id("hat")).unwrap());
    assert!(!store.remove_item(&id("hat")).unwrap());
    assert!(store.items().is_empty());
}

#[tokio::test]
async fn test_total_tracks_every_change() {
    let (store, _) = store();
    store.add_item(item("a", 1_999)).await.unwrap();
    store.add_item(item("b", 501)).await.unwrap();
    assert_eq!(store.total().unwrap(), "25.00");

    store.update_quantity(&id("a"), 3).unwrap();
    assert_eq!(store.total().unwrap(), "64.98");

    store.save_for_later(&id("b")).await.unwrap();
    assert_eq!(store.total().unwrap(), "59.97");

    store.update_quantity(&id("a"), 0).unwrap();
    assert_eq!(store.total().unwrap(), "0.00");
}

#[tokio::test]
async fn test_save_then_move_keeps_quantity_and_order() {
    let (store, _) = store();
    store.add_item(item("a", 100)).await.unwrap();
    store.add_item(item("b", 100)).await.unwrap();
    store.update_quantity(&id("b"), 4).unwrap();

    store.save_for_later(&id("b")).await.unwrap();
    store.move_to_cart(&id("b")).await.unwrap();

    let items = store.items();
    assert_eq!(ids(&items), ["a", "b"]);
    assert_eq!(items[1].quantity.get(), 4);
}

#[tokio::test]
async fn test_adding_saved_product_reclaims_it() {
    let (store, backend) = store();
    store.add_item(item("mug", 1_400)).await.unwrap();
    store.update_quantity(&id("mug"), 2).unwrap();
    store.save_for_later(&id("mug")).await.unwrap();

    let outcome = store.add_item(item("mug", 1_400)).await.unwrap();
    assert_eq!(outcome, AddOutcome::Reclaimed);
    assert_eq!(store.items()[0].quantity.get(), 3);
    assert!(store.saved_items().is_empty());
    assert!(backend.stored(store.shopper()).is_empty());
    assert_exclusive(&store);
}

#[tokio::test]
async fn test_exclusive_through_mixed_operations() {
    let (store, _) = store();
    for product in ["a", "b", "c"] {
        store.add_item(item(product, 300)).await.unwrap();
        assert_exclusive(&store);
    }

    store.save_for_later(&id("a")).await.unwrap();
    assert_exclusive(&store);
    store.save_for_later(&id("c")).await.unwrap();
    assert_exclusive(&store);
    store.add_item(item("a", 300)).await.unwrap();
    assert_exclusive(&store);
    store.move_to_cart(&id("c")).await.unwrap();
    assert_exclusive(&store);
    store.save_for_later(&id("b")).await.unwrap();
    assert_exclusive(&store);
    store.remove_saved_item(&id("b")).await.unwrap();
    assert_exclusive(&store);

    assert_eq!(ids(&store.items()), ["a", "c"]);
    assert!(store.saved_items().is_empty());
}

#[tokio::test]
async fn test_errors_leave_cart_untouched() {
    let (store, _) = store();
    store.add_item(item("a", 100)).await.unwrap();
    let before = store.snapshot().unwrap();

    assert!(matches!(
        store.save_for_later(&id("zzz")).await,
        Err(CartError::NotInCart(_))
    ));
    assert!(matches!(
        store.move_to_cart(&id("a")).await,
        Err(CartError::NotSaved(_))
    ));
    assert!(matches!(
        store.update_quantity(&id("a"), i64::MAX),
        Err(CartError::InvalidQuantity(_))
    ));
    assert!(matches!(
        store.add_item(item("", 100)).await,
        Err(CartError::MissingId)
    ));
    assert!(matches!(
        store.add_item(item("b", -1)).await,
        Err(CartError::InvalidPrice(_))
    ));

    assert_eq!(store.snapshot().unwrap(), before);
}

#[tokio::test]
async fn test_saved_lines_survive_a_new_store() {
    let backend = Arc::new(InMemorySavedItems::new());
    let shopper = ShopperKey::new("returning");

    let first = CartStore::new(shopper.clone(), Arc::clone(&backend));
    first.add_item(item("scarf", 3_900)).await.unwrap();
    first.add_item(item("gloves", 2_500)).await.unwrap();
    first.save_for_later(&id("scarf")).await.unwrap();

    let second = CartStore::new(shopper, backend);
    assert_eq!(second.restore_saved().await.unwrap(), 1);
    assert_eq!(ids(&second.saved_items()), ["scarf"]);
    assert!(second.items().is_empty());
}

fn priced(id: &str, price: Decimal) -> NewCartItem {
    NewCartItem {
        price,
        ..item(id, 0)
    }
}

#[tokio::test]
async fn test_unbounded_price_never_reaches_the_total() {
    let (store, backend) = store();
    store.add_item(item("a", 1_250)).await.unwrap();

    assert!(matches!(
        store.add_item(priced("huge", Decimal::MAX)).await,
        Err(CartError::InvalidPrice(_))
    ));
    store.update_quantity(&id("a"), i64::from(u32::MAX)).unwrap();

    assert_eq!(ids(&store.items()), ["a"]);
    assert!(store.total().is_ok());
    assert!(backend.stored(store.shopper()).is_empty());
}

#[tokio::test]
async fn test_most_expensive_lines_still_total() {
    let (store, _) = store();
    store.add_item(priced("a", MAX_UNIT_PRICE)).await.unwrap();
    store.add_item(priced("b", MAX_UNIT_PRICE)).await.unwrap();
    store.update_quantity(&id("a"), i64::from(u32::MAX)).unwrap();
    store.update_quantity(&id("b"), i64::from(u32::MAX)).unwrap();

    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.items.len(), 2);
    assert!(!snapshot.total.starts_with('-'));
}
