//! Remote persistence for saved-for-later cart lines.
//!
//! The cart keeps saved lines in memory and mirrors every change to a
//! [`SavedItemsBackend`]. Backends are keyed by [`ShopperKey`] so a shopper's
//! saved lines survive the in-memory session.
//!
//! # Implementations
//!
//! - [`PgSavedItems`] - `storefront.saved_item` table in `PostgreSQL`
//! - [`InMemorySavedItems`] - process-local map for tests and local runs

mod memory;
mod postgres;

use std::future::Future;

use bramble_core::{CartItem, ProductId, ShopperKey};
use thiserror::Error;

pub use memory::InMemorySavedItems;
pub use postgres::PgSavedItems;

/// Errors reported by a saved-items backend.
///
/// Messages are safe to show to the shopper.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The backend could not be reached.
    #[error("saved items are temporarily unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the change.
    #[error("saved items rejected the change: {0}")]
    Rejected(String),

    /// Stored data could not be read back.
    #[error("saved items are corrupted: {0}")]
    Corrupt(String),
}

/// Storage for a shopper's saved-for-later lines.
///
/// Methods return `Send` futures so calls can run on a spawned task and finish
/// even if the request that started them is dropped.
pub trait SavedItemsBackend: Send + Sync + 'static {
    /// Insert or replace a saved line.
    fn save(
        &self,
        shopper: &ShopperKey,
        item: &CartItem,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Delete a saved line. Deleting a missing line succeeds.
    fn remove(
        &self,
        shopper: &ShopperKey,
        id: &ProductId,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// All saved lines for a shopper, oldest first.
    fn list(
        &self,
        shopper: &ShopperKey,
    ) -> impl Future<Output = Result<Vec<CartItem>, BackendError>> + Send;
}
