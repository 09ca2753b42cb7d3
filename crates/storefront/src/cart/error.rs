//! Cart operation errors.

use bramble_core::ProductId;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::backend::BackendError;

/// Errors from cart store operations.
///
/// Validation and lookup errors are returned before any state changes.
/// Remote errors are returned after the local change has been rolled back.
#[derive(Debug, Error)]
pub enum CartError {
    /// Product id was empty.
    #[error("product id is required")]
    MissingId,

    /// Quantity cannot be represented.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Unit price is negative or above `MAX_UNIT_PRICE`.
    #[error("invalid price: {0}")]
    InvalidPrice(Decimal),

    /// Product is not in the active cart.
    #[error("{0} is not in the cart")]
    NotInCart(ProductId),

    /// Product is not saved for later.
    #[error("{0} is not saved for later")]
    NotSaved(ProductId),

    /// Saved-items backend failed; the local change was undone.
    #[error("could not update saved items for {id}: {source}")]
    Remote {
        id: ProductId,
        #[source]
        source: BackendError,
    },

    /// Stored saved lines could not be loaded.
    #[error("could not load saved items: {0}")]
    Load(#[from] BackendError),

    /// Cart total does not fit in a decimal.
    #[error("cart total is too large")]
    TotalOverflow,

    /// The background task running the backend call did not finish.
    #[error("saved items update interrupted: {0}")]
    Interrupted(String),
}
