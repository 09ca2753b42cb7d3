//! Process-local saved-items backend.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use bramble_core::{CartItem, ProductId, ShopperKey};

use super::{BackendError, SavedItemsBackend};

/// Saved lines kept in a map, lost on restart.
#[derive(Debug, Default)]
pub struct InMemorySavedItems {
    shoppers: Mutex<HashMap<ShopperKey, Vec<CartItem>>>,
}

impl InMemorySavedItems {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved lines currently stored for a shopper.
    #[must_use]
    pub fn stored(&self, shopper: &ShopperKey) -> Vec<CartItem> {
        self.shoppers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(shopper)
            .cloned()
            .unwrap_or_default()
    }
}

impl SavedItemsBackend for InMemorySavedItems {
    async fn save(&self, shopper: &ShopperKey, item: &CartItem) -> Result<(), BackendError> {
        let mut shoppers = self.shoppers.lock().unwrap_or_else(PoisonError::into_inner);
        let lines = shoppers.entry(shopper.clone()).or_default();
        match lines.iter_mut().find(|line| line.id == item.id) {
            Some(line) => *line = item.clone(),
            None => lines.push(item.clone()),
        }
        Ok(())
    }

    async fn remove(&self, shopper: &ShopperKey, id: &ProductId) -> Result<(), BackendError> {
        let mut shoppers = self.shoppers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lines) = shoppers.get_mut(shopper) {
            lines.retain(|line| &line.id != id);
        }
        Ok(())
    }

    async fn list(&self, shopper: &ShopperKey) -> Result<Vec<CartItem>, BackendError> {
        Ok(self.stored(shopper))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use bramble_core::{NewCartItem, Quantity};
    use rust_decimal::Decimal;

    use super::*;

    fn line(id: &str, quantity: u32) -> CartItem {
        NewCartItem {
            id: ProductId::new(id),
            name: id.to_string(),
            price: Decimal::ONE,
            image: String::new(),
            size: None,
        }
        .with_quantity(Quantity::new(quantity).unwrap())
    }

    #[tokio::test]
    async fn test_save_replaces_existing_line() {
        let backend = InMemorySavedItems::new();
        let shopper = ShopperKey::new("s1");

        backend.save(&shopper, &line("a", 1)).await.unwrap();
        backend.save(&shopper, &line("a", 3)).await.unwrap();

        let stored = backend.list(&shopper).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].quantity.get(), 3);
    }

    #[tokio::test]
    async fn test_shoppers_are_isolated() {
        let backend = InMemorySavedItems::new();
        backend
            .save(&ShopperKey::new("s1"), &line("a", 1))
            .await
            .unwrap();

        assert!(backend.list(&ShopperKey::new("s2")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let backend = InMemorySavedItems::new();
        let shopper = ShopperKey::new("s1");
        backend
            .remove(&shopper, &ProductId::new("nope"))
            .await
            .unwrap();
        backend.save(&shopper, &line("a", 1)).await.unwrap();
        backend.remove(&shopper, &ProductId::new("a")).await.unwrap();
        assert!(backend.stored(&shopper).is_empty());
    }
}
