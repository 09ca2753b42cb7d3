//! Shopping cart store.
//!
//! [`CartStore`] is a shopper's cart: active lines plus saved-for-later lines.
//! Active-line operations are in-memory only. Operations that touch saved lines
//! also call the [`SavedItemsBackend`].
//!
//! # Consistency
//!
//! Saved-line operations apply their local change in one step, then confirm it
//! with the backend on a spawned task. If the backend fails, the task reverts
//! the local change (unless a newer change to the same product happened in the
//! meantime) and the caller gets [`CartError::Remote`]. The task runs to
//! completion even if the caller stops waiting.
//!
//! Backend calls of one cart run one at a time, in the order of the local
//! changes that issued them, so the stored saved lines always end up matching
//! the last local change.

mod error;
mod state;

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bramble_core::{CartItem, NewCartItem, ProductId, Quantity, ShopperKey};
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use crate::backend::{BackendError, SavedItemsBackend};

pub use error::CartError;
pub use state::{AddOutcome, CartSnapshot, CartState, Revision, Transition};

/// Undo function applied when the backend rejects a transition.
type Revert = fn(&mut CartState, &Transition) -> bool;

/// Cart state plus the tail of its backend call queue.
///
/// Both live under one lock so a transition and its place in the queue are
/// taken together.
#[derive(Debug, Default)]
struct Shared {
    cart: CartState,
    last_call: Option<oneshot::Receiver<()>>,
}

impl Shared {
    /// Take the next place in the backend call queue.
    fn enqueue(&mut self) -> Turn {
        let (done, next) = oneshot::channel();
        Turn {
            previous: self.last_call.replace(next),
            _done: done,
        }
    }
}

/// A place in a cart's backend call queue.
///
/// Dropping it lets the next call start.
struct Turn {
    previous: Option<oneshot::Receiver<()>>,
    _done: oneshot::Sender<()>,
}

impl Turn {
    /// Wait until every earlier backend call has finished.
    async fn wait(&mut self) {
        if let Some(previous) = self.previous.take() {
            // Closed without a value once the earlier call is done
            let _ = previous.await;
        }
    }
}

/// A shopper's cart.
///
/// Cheap to clone; clones share the same state.
pub struct CartStore<B> {
    shopper: ShopperKey,
    shared: Arc<Mutex<Shared>>,
    backend: Arc<B>,
}

impl<B> Clone for CartStore<B> {
    fn clone(&self) -> Self {
        Self {
            shopper: self.shopper.clone(),
            shared: Arc::clone(&self.shared),
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: SavedItemsBackend> CartStore<B> {
    /// Create an empty cart for a shopper.
    #[must_use]
    pub fn new(shopper: ShopperKey, backend: Arc<B>) -> Self {
        Self {
            shopper,
            shared: Arc::new(Mutex::new(Shared::default())),
            backend,
        }
    }

    /// Shopper that owns this cart.
    #[must_use]
    pub const fn shopper(&self) -> &ShopperKey {
        &self.shopper
    }

    /// Copy of both lists and the current total.
    ///
    /// # Errors
    ///
    /// Returns `CartError::TotalOverflow` if the total cannot be represented.
    pub fn snapshot(&self) -> Result<CartSnapshot, CartError> {
        self.lock().cart.snapshot()
    }

    /// Active lines.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock().cart.items().to_vec()
    }

    /// Saved-for-later lines.
    #[must_use]
    pub fn saved_items(&self) -> Vec<CartItem> {
        self.lock().cart.saved_items().to_vec()
    }

    /// Display total of the active lines, e.g. `"20.00"`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::TotalOverflow` if the total cannot be represented.
    pub fn total(&self) -> Result<String, CartError> {
        self.lock().cart.total()
    }

    /// Number of units in the active cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lock().cart.item_count()
    }

    /// Add one unit of a product.
    ///
    /// If the product was saved for later it moves back into the cart with its
    /// saved quantity plus one, and its stored saved line is deleted. That
    /// delete is best effort.
    ///
    /// # Errors
    ///
    /// Returns `CartError::MissingId` if the product id is blank, or
    /// `CartError::InvalidPrice` if the price is negative or above
    /// [`MAX_UNIT_PRICE`](bramble_core::MAX_UNIT_PRICE).
    #[instrument(skip(self, product), fields(shopper = %self.shopper, product_id = %product.id))]
    pub async fn add_item(&self, product: NewCartItem) -> Result<AddOutcome, CartError> {
        ensure_id(&product.id)?;
        if !product.has_valid_price() {
            return Err(CartError::InvalidPrice(product.price));
        }
        let id = product.id.clone();

        let (outcome, turn) = {
            let mut shared = self.lock();
            let outcome = shared.cart.add_item(product);
            let turn = (outcome == AddOutcome::Reclaimed).then(|| shared.enqueue());
            (outcome, turn)
        };
        debug!(?outcome, "added item");

        if let Some(mut turn) = turn {
            let backend = Arc::clone(&self.backend);
            let shopper = self.shopper.clone();
            let cleanup = tokio::spawn(async move {
                turn.wait().await;
                if let Err(error) = backend.remove(&shopper, &id).await {
                    warn!(%shopper, product_id = %id, %error, "failed to delete reclaimed saved line");
                }
            });
            if let Err(error) = cleanup.await {
                warn!(%error, "saved line cleanup task did not finish");
            }
        }

        Ok(outcome)
    }

    /// Remove an active line. Removing an absent line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CartError::MissingId` if the id is blank.
    pub fn remove_item(&self, id: &ProductId) -> Result<bool, CartError> {
        ensure_id(id)?;
        Ok(self.lock().cart.remove_item(id).is_some())
    }

    /// Set the quantity of an active line.
    ///
    /// A quantity of zero or less removes the line. Returns whether a line
    /// was changed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::MissingId` if the id is blank, or
    /// `CartError::InvalidQuantity` if the quantity exceeds `u32::MAX`.
    pub fn update_quantity(&self, id: &ProductId, quantity: i64) -> Result<bool, CartError> {
        ensure_id(id)?;
        if quantity <= 0 {
            return Ok(self.lock().cart.remove_item(id).is_some());
        }
        let quantity =
            Quantity::try_from(quantity).map_err(|_| CartError::InvalidQuantity(quantity))?;
        Ok(self.lock().cart.set_quantity(id, quantity))
    }

    /// Move an active line to the saved list and store it.
    ///
    /// # Errors
    ///
    /// - `CartError::MissingId` if the id is blank
    /// - `CartError::NotInCart` if the product is not an active line
    /// - `CartError::Remote` if the backend failed (the line is back in the cart)
    #[instrument(skip(self), fields(shopper = %self.shopper))]
    pub async fn save_for_later(&self, id: &ProductId) -> Result<CartItem, CartError> {
        ensure_id(id)?;
        let (transition, turn) = {
            let mut shared = self.lock();
            let transition = shared
                .cart
                .stash(id)
                .ok_or_else(|| CartError::NotInCart(id.clone()))?;
            (transition, shared.enqueue())
        };

        let backend = Arc::clone(&self.backend);
        let shopper = self.shopper.clone();
        let item = transition.item.clone();
        let remote = async move { backend.save(&shopper, &item).await };

        let item = transition.item.clone();
        self.confirm(transition, turn, remote, CartState::revert_stash)
            .await?;
        Ok(item)
    }

    /// Move a saved line back into the cart and delete the stored copy.
    ///
    /// # Errors
    ///
    /// - `CartError::MissingId` if the id is blank
    /// - `CartError::NotSaved` if the product is not saved
    /// - `CartError::Remote` if the backend failed (the line is saved again)
    #[instrument(skip(self), fields(shopper = %self.shopper))]
    pub async fn move_to_cart(&self, id: &ProductId) -> Result<CartItem, CartError> {
        ensure_id(id)?;
        let (transition, turn) = {
            let mut shared = self.lock();
            let transition = shared
                .cart
                .unstash(id)
                .ok_or_else(|| CartError::NotSaved(id.clone()))?;
            (transition, shared.enqueue())
        };

        let backend = Arc::clone(&self.backend);
        let shopper = self.shopper.clone();
        let remote_id = id.clone();
        let remote = async move { backend.remove(&shopper, &remote_id).await };

        let item = transition.item.clone();
        self.confirm(transition, turn, remote, CartState::revert_unstash)
            .await?;
        Ok(item)
    }

    /// Delete a saved line. Deleting an absent line is a no-op.
    ///
    /// # Errors
    ///
    /// - `CartError::MissingId` if the id is blank
    /// - `CartError::Remote` if the backend failed (the line is saved again)
    #[instrument(skip(self), fields(shopper = %self.shopper))]
    pub async fn remove_saved_item(&self, id: &ProductId) -> Result<bool, CartError> {
        ensure_id(id)?;
        let (transition, turn) = {
            let mut shared = self.lock();
            let Some(transition) = shared.cart.drop_saved(id) else {
                return Ok(false);
            };
            (transition, shared.enqueue())
        };

        let backend = Arc::clone(&self.backend);
        let shopper = self.shopper.clone();
        let remote_id = id.clone();
        let remote = async move { backend.remove(&shopper, &remote_id).await };

        self.confirm(transition, turn, remote, CartState::revert_drop_saved)
            .await?;
        Ok(true)
    }

    /// Load stored saved lines into the saved list.
    ///
    /// Lines for products already in either list are skipped. Returns the
    /// number of lines added.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Load` if the backend cannot list saved lines.
    #[instrument(skip(self), fields(shopper = %self.shopper))]
    pub async fn restore_saved(&self) -> Result<usize, CartError> {
        let stored = self.backend.list(&self.shopper).await?;
        let mut shared = self.lock();
        let restored = stored
            .into_iter()
            .map(|item| shared.cart.restore_saved(item))
            .filter(|added| *added)
            .count();
        debug!(restored, "restored saved lines");
        Ok(restored)
    }

    /// Run a backend call on its own task once its turn comes, reverting
    /// `transition` if it fails.
    async fn confirm<F>(
        &self,
        transition: Transition,
        mut turn: Turn,
        remote: F,
        revert: Revert,
    ) -> Result<(), CartError>
    where
        F: Future<Output = Result<(), BackendError>> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let shopper = self.shopper.clone();

        let task = tokio::spawn(async move {
            turn.wait().await;
            let result = remote.await;

            let mut guard = lock(&shared);
            let outcome = match result {
                Ok(()) => Ok(()),
                Err(source) => {
                    let reverted = revert(&mut guard.cart, &transition);
                    let id = transition.item.id.clone();
                    if reverted {
                        warn!(%shopper, product_id = %id, error = %source, "saved items update failed, reverted");
                    } else {
                        warn!(%shopper, product_id = %id, error = %source, "saved items update failed, newer change kept");
                    }
                    Err(CartError::Remote { id, source })
                }
            };
            guard.cart.settle(&transition);
            outcome
        });

        task.await
            .map_err(|e| CartError::Interrupted(e.to_string()))?
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        lock(&self.shared)
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    // Every transition is a single step, so a poisoned state is still consistent
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

fn ensure_id(id: &ProductId) -> Result<(), CartError> {
    if id.is_blank() {
        return Err(CartError::MissingId);
    }
    Ok(())
}
