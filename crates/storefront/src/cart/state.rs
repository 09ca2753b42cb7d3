//! In-memory cart state.
//!
//! `CartState` holds the active lines and the saved-for-later lines of one
//! shopper. Every method is a single synchronous transition that keeps a product
//! in at most one of the two lists.
//!
//! Each transition stamps the ids it touches with a fresh [`Revision`]. The
//! `revert_*` methods only undo a transition when the id's revision is still the
//! one the transition produced, so a late rollback can never clobber a newer
//! change to the same product. Ids that have left both lists and have no
//! backend call pending lose their revision; the clock never repeats, so a
//! later stamp for the same id is always newer.

use std::collections::HashMap;

use bramble_core::{CartItem, NewCartItem, ProductId, Quantity, format_amount};
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::CartError;

/// Logical timestamp of the last transition that touched a product id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(u64);

/// Record of a move between lists, used to revert it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The line that moved.
    pub item: CartItem,
    /// Position it occupied in the source list.
    pub index: usize,
    /// Revision stamped by the move.
    pub revision: Revision,
}

/// What `add_item` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended with quantity 1.
    Appended,
    /// An existing active line gained one unit.
    Incremented,
    /// The product was in the saved list; it moved back with one more unit.
    Reclaimed,
}

/// Active and saved-for-later cart lines.
#[derive(Debug, Default)]
pub struct CartState {
    items: Vec<CartItem>,
    saved_items: Vec<CartItem>,
    revisions: HashMap<ProductId, Revision>,
    clock: u64,
}

/// Read-only copy of a cart for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub saved_items: Vec<CartItem>,
    /// Sum of line totals, two decimals.
    pub total: String,
    /// Number of units in the active cart.
    pub item_count: u64,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Active lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Saved-for-later lines in insertion order.
    #[must_use]
    pub fn saved_items(&self) -> &[CartItem] {
        &self.saved_items
    }

    /// Sum of `price * quantity` over the active lines, `None` on overflow.
    #[must_use]
    pub fn subtotal(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.line_total()?))
    }

    /// Display total of the active lines, recomputed on every call.
    ///
    /// # Errors
    ///
    /// Returns `CartError::TotalOverflow` if the sum cannot be represented.
    pub fn total(&self) -> Result<String, CartError> {
        self.subtotal()
            .map(format_amount)
            .ok_or(CartError::TotalOverflow)
    }

    /// Number of units across active lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Whether `id` is an active line.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        position(&self.items, id).is_some()
    }

    /// Whether `id` is a saved line.
    #[must_use]
    pub fn is_saved(&self, id: &ProductId) -> bool {
        position(&self.saved_items, id).is_some()
    }

    /// Copy the current state for rendering.
    ///
    /// # Errors
    ///
    /// Returns `CartError::TotalOverflow` if the total cannot be represented.
    pub fn snapshot(&self) -> Result<CartSnapshot, CartError> {
        Ok(CartSnapshot {
            items: self.items.clone(),
            saved_items: self.saved_items.clone(),
            total: self.total()?,
            item_count: self.item_count(),
        })
    }

    /// Add one unit of a product.
    ///
    /// Increments an existing active line, or appends a new line. A product
    /// that was saved for later leaves the saved list and comes back with its
    /// saved quantity plus one, rather than starting over at one, so the units
    /// the shopper set aside are not lost.
    pub fn add_item(&mut self, product: NewCartItem) -> AddOutcome {
        let id = product.id.clone();
        self.touch(&id);

        if let Some(line) = self.items.iter_mut().find(|line| line.id == id) {
            line.quantity = line.quantity.increment();
            return AddOutcome::Incremented;
        }

        if let Some(index) = position(&self.saved_items, &id) {
            let saved = self.saved_items.remove(index);
            let mut line = product.with_quantity(saved.quantity.increment());
            if line.size.is_none() {
                line.size = saved.size;
            }
            self.items.push(line);
            return AddOutcome::Reclaimed;
        }

        self.items.push(product.with_quantity(Quantity::ONE));
        AddOutcome::Appended
    }

    /// Remove an active line. Returns the removed line, if any.
    pub fn remove_item(&mut self, id: &ProductId) -> Option<CartItem> {
        let index = position(&self.items, id)?;
        let item = self.items.remove(index);
        self.revisions.remove(id);
        Some(item)
    }

    /// Set the quantity of an active line. Returns `false` if absent.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: Quantity) -> bool {
        let Some(index) = position(&self.items, id) else {
            return false;
        };
        self.touch(id);
        if let Some(line) = self.items.get_mut(index) {
            line.quantity = quantity;
        }
        true
    }

    /// Move an active line to the end of the saved list.
    pub fn stash(&mut self, id: &ProductId) -> Option<Transition> {
        let index = position(&self.items, id)?;
        let item = self.items.remove(index);
        self.saved_items.push(item.clone());
        Some(Transition {
            item,
            index,
            revision: self.touch(id),
        })
    }

    /// Move a saved line to the end of the active list.
    ///
    /// The returned transition carries the line as it now reads in the cart.
    pub fn unstash(&mut self, id: &ProductId) -> Option<Transition> {
        let index = position(&self.saved_items, id)?;
        let saved = self.saved_items.remove(index);
        let item = self.merge_into_items(saved);
        Some(Transition {
            item,
            index,
            revision: self.touch(id),
        })
    }

    /// Remove a saved line.
    pub fn drop_saved(&mut self, id: &ProductId) -> Option<Transition> {
        let index = position(&self.saved_items, id)?;
        let item = self.saved_items.remove(index);
        Some(Transition {
            item,
            index,
            revision: self.touch(id),
        })
    }

    /// Add a saved line loaded from storage.
    ///
    /// Ignored if the product is already active or saved.
    pub fn restore_saved(&mut self, item: CartItem) -> bool {
        if self.contains(&item.id) || self.is_saved(&item.id) {
            return false;
        }
        self.touch(&item.id);
        self.saved_items.push(item);
        true
    }

    /// Undo a [`stash`](Self::stash): saved line goes back to its old position.
    pub fn revert_stash(&mut self, transition: &Transition) -> bool {
        let id = &transition.item.id;
        if !self.is_current(id, transition.revision) {
            return false;
        }
        let Some(index) = position(&self.saved_items, id) else {
            return false;
        };
        let item = self.saved_items.remove(index);
        insert_at(&mut self.items, transition.index, item);
        self.touch(id);
        true
    }

    /// Undo an [`unstash`](Self::unstash): active line goes back to the saved list.
    pub fn revert_unstash(&mut self, transition: &Transition) -> bool {
        let id = &transition.item.id;
        if !self.is_current(id, transition.revision) {
            return false;
        }
        let Some(index) = position(&self.items, id) else {
            return false;
        };
        let item = self.items.remove(index);
        insert_at(&mut self.saved_items, transition.index, item);
        self.touch(id);
        true
    }

    /// Undo a [`drop_saved`](Self::drop_saved): the saved line reappears.
    pub fn revert_drop_saved(&mut self, transition: &Transition) -> bool {
        let id = &transition.item.id;
        if !self.is_current(id, transition.revision) || self.contains(id) || self.is_saved(id) {
            return false;
        }
        insert_at(
            &mut self.saved_items,
            transition.index,
            transition.item.clone(),
        );
        self.touch(id);
        true
    }

    /// Drop the revision of a product whose backend call has finished, if the
    /// product is in neither list and nothing changed it since.
    pub fn settle(&mut self, transition: &Transition) {
        let id = &transition.item.id;
        if self.is_current(id, transition.revision) && !self.contains(id) && !self.is_saved(id) {
            self.revisions.remove(id);
        }
    }

    fn merge_into_items(&mut self, incoming: CartItem) -> CartItem {
        if let Some(line) = self.items.iter_mut().find(|line| line.id == incoming.id) {
            line.quantity = line.quantity.merge(incoming.quantity);
            return line.clone();
        }
        self.items.push(incoming.clone());
        incoming
    }

    fn is_current(&self, id: &ProductId, revision: Revision) -> bool {
        self.revisions.get(id) == Some(&revision)
    }

    fn touch(&mut self, id: &ProductId) -> Revision {
        self.clock += 1;
        let revision = Revision(self.clock);
        self.revisions.insert(id.clone(), revision);
        revision
    }
}

fn position(lines: &[CartItem], id: &ProductId) -> Option<usize> {
    lines.iter().position(|line| &line.id == id)
}

fn insert_at(lines: &mut Vec<CartItem>, index: usize, item: CartItem) {
    let index = index.min(lines.len());
    lines.insert(index, item);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(id: &str, cents: i64) -> NewCartItem {
        NewCartItem {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Decimal::new(cents, 2),
            image: format!("/img/{id}.jpg"),
            size: None,
        }
    }

    fn id(value: &str) -> ProductId {
        ProductId::new(value)
    }

    fn assert_exclusive(state: &CartState) {
        for line in state.items() {
            assert!(
                !state.is_saved(&line.id),
                "{} is both active and saved",
                line.id
            );
        }
    }

    #[test]
    fn test_repeated_add_merges_quantity() {
        let mut state = CartState::new();
        for _ in 0..5 {
            state.add_item(product("a", 1_000));
        }
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].quantity.get(), 5);
    }

    #[test]
    fn test_add_appends_new_lines_in_order() {
        let mut state = CartState::new();
        assert_eq!(state.add_item(product("a", 100)), AddOutcome::Appended);
        assert_eq!(state.add_item(product("b", 100)), AddOutcome::Appended);
        assert_eq!(state.add_item(product("a", 100)), AddOutcome::Incremented);
        assert_eq!(state.add_item(product("c", 100)), AddOutcome::Appended);

        let ids: Vec<_> = state.items().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut state = CartState::new();
        state.add_item(product("a", 100));
        assert!(state.remove_item(&id("a")).is_some());
        assert!(state.remove_item(&id("a")).is_none());
        assert!(state.items().is_empty());
    }

    #[test]
    fn test_total_tracks_lines() {
        let mut state = CartState::new();
        assert_eq!(state.total().unwrap(), "0.00");
        state.add_item(product("a", 1_000));
        assert_eq!(state.total().unwrap(), "10.00");
        state.add_item(product("a", 1_000));
        state.add_item(product("b", 250));
        assert_eq!(state.total().unwrap(), "22.50");
        state.set_quantity(&id("b"), Quantity::new(4).unwrap());
        assert_eq!(state.total().unwrap(), "30.00");
        assert_eq!(state.item_count(), 6);
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let mut state = CartState::new();
        let mut huge = product("a", 0);
        huge.price = Decimal::MAX;
        state.add_item(huge.clone());
        state.add_item(huge);

        assert!(state.subtotal().is_none());
        assert!(matches!(state.total(), Err(CartError::TotalOverflow)));
        assert!(matches!(state.snapshot(), Err(CartError::TotalOverflow)));

        state.remove_item(&id("a"));
        assert_eq!(state.total().unwrap(), "0.00");
    }

    #[test]
    fn test_removed_lines_drop_their_revision() {
        let mut state = CartState::new();
        state.add_item(product("a", 100));
        state.add_item(product("b", 100));
        assert_eq!(state.revisions.len(), 2);

        state.remove_item(&id("a"));
        assert_eq!(state.revisions.len(), 1);

        let stashed = state.stash(&id("b")).unwrap();
        state.settle(&stashed);
        assert_eq!(state.revisions.len(), 1, "saved lines keep their revision");

        let dropped = state.drop_saved(&id("b")).unwrap();
        assert_eq!(state.revisions.len(), 1, "pending call keeps the revision");
        state.settle(&dropped);
        assert!(state.revisions.is_empty());
    }

    #[test]
    fn test_revert_skipped_after_line_removed_and_re_added() {
        let mut state = CartState::new();
        state.add_item(product("a", 100));
        state.stash(&id("a")).unwrap();

        let transition = state.unstash(&id("a")).unwrap();
        state.remove_item(&id("a"));
        state.add_item(product("a", 100));

        assert!(!state.revert_unstash(&transition));
        assert_eq!(state.items().len(), 1);
        assert!(state.saved_items().is_empty());
    }

    #[test]
    fn test_stash_and_unstash_round_trip() {
        let mut state = CartState::new();
        state.add_item(product("a", 1_000));
        state.add_item(product("a", 1_000));

        let stashed = state.stash(&id("a")).unwrap();
        assert_eq!(stashed.item.quantity.get(), 2);
        assert!(state.items().is_empty());
        assert_eq!(state.saved_items().len(), 1);
        assert_exclusive(&state);

        let unstashed = state.unstash(&id("a")).unwrap();
        assert_eq!(unstashed.item.quantity.get(), 2);
        assert_eq!(state.items()[0].quantity.get(), 2);
        assert!(state.saved_items().is_empty());
        assert_exclusive(&state);
    }

    #[test]
    fn test_add_reclaims_saved_line() {
        let mut state = CartState::new();
        state.add_item(product("a", 1_000));
        state.add_item(product("a", 1_000));
        state.stash(&id("a")).unwrap();

        assert_eq!(state.add_item(product("a", 1_000)), AddOutcome::Reclaimed);
        assert!(state.saved_items().is_empty());
        assert_eq!(state.items()[0].quantity.get(), 3);
        assert_exclusive(&state);
    }

    #[test]
    fn test_revert_stash_restores_position() {
        let mut state = CartState::new();
        state.add_item(product("a", 100));
        state.add_item(product("b", 100));
        state.add_item(product("c", 100));

        let transition = state.stash(&id("b")).unwrap();
        assert!(state.revert_stash(&transition));

        let ids: Vec<_> = state.items().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert!(state.saved_items().is_empty());
    }

    #[test]
    fn test_revert_skipped_after_newer_change() {
        let mut state = CartState::new();
        state.add_item(product("a", 100));

        let transition = state.stash(&id("a")).unwrap();
        // Shopper moves it back before the save is confirmed
        state.unstash(&id("a")).unwrap();

        assert!(!state.revert_stash(&transition));
        assert_eq!(state.items().len(), 1);
        assert!(state.saved_items().is_empty());
    }

    #[test]
    fn test_revert_unstash() {
        let mut state = CartState::new();
        state.add_item(product("a", 100));
        state.stash(&id("a")).unwrap();

        let transition = state.unstash(&id("a")).unwrap();
        assert!(state.revert_unstash(&transition));
        assert!(state.items().is_empty());
        assert_eq!(state.saved_items().len(), 1);
    }

    #[test]
    fn test_revert_drop_saved() {
        let mut state = CartState::new();
        state.add_item(product("a", 100));
        state.add_item(product("b", 100));
        state.stash(&id("a")).unwrap();
        state.stash(&id("b")).unwrap();

        let transition = state.drop_saved(&id("a")).unwrap();
        assert_eq!(state.saved_items().len(), 1);
        assert!(state.revert_drop_saved(&transition));

        let ids: Vec<_> = state.saved_items().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn test_revert_drop_saved_skipped_when_re_added() {
        let mut state = CartState::new();
        state.add_item(product("a", 100));
        state.stash(&id("a")).unwrap();

        let transition = state.drop_saved(&id("a")).unwrap();
        state.add_item(product("a", 100));

        assert!(!state.revert_drop_saved(&transition));
        assert!(state.saved_items().is_empty());
        assert_exclusive(&state);
    }

    #[test]
    fn test_restore_saved_skips_known_ids() {
        let mut state = CartState::new();
        state.add_item(product("a", 100));

        let stored_a = product("a", 100).with_quantity(Quantity::ONE);
        let stored_b = product("b", 100).with_quantity(Quantity::new(2).unwrap());

        assert!(!state.restore_saved(stored_a));
        assert!(state.restore_saved(stored_b.clone()));
        assert!(!state.restore_saved(stored_b));
        assert_eq!(state.saved_items().len(), 1);
        assert_exclusive(&state);
    }

    #[test]
    fn test_snapshot_serializes_total_as_string() {
        let mut state = CartState::new();
        state.add_item(product("a", 1_000));
        let json = serde_json::to_value(state.snapshot().unwrap()).unwrap();
        assert_eq!(json["total"], "10.00");
        assert_eq!(json["item_count"], 1);
        assert_eq!(json["items"][0]["quantity"], 1);
    }
}
