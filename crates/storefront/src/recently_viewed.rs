//! Recently viewed products.
//!
//! A short, most-recent-first list of products the shopper opened. Viewing a
//! product again moves it to the front instead of duplicating it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bramble_core::Product;

/// Maximum number of products kept.
pub const RECENTLY_VIEWED_LIMIT: usize = 4;

/// A shopper's recently viewed products.
///
/// Cheap to clone; clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct RecentlyViewedStore {
    products: Arc<Mutex<VecDeque<Product>>>,
}

impl RecentlyViewedStore {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a view.
    pub fn add(&self, product: Product) {
        let mut products = self.lock();
        products.retain(|viewed| viewed.id != product.id);
        products.push_front(product);
        products.truncate(RECENTLY_VIEWED_LIMIT);
    }

    /// Products, most recent first.
    #[must_use]
    pub fn list(&self) -> Vec<Product> {
        self.lock().iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Product>> {
        self.products.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
