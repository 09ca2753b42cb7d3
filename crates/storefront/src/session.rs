//! Per-shopper session stores.
//!
//! Each shopper key owns one [`ShopperSession`] holding its cart and recently
//! viewed list. The [`SessionRegistry`] creates sessions on first use and
//! drops them once they have been idle for the session lifetime.

use std::sync::Arc;
use std::time::Duration;

use bramble_core::ShopperKey;
use moka::future::Cache;
use moka::notification::RemovalCause;
use tracing::{debug, instrument, warn};

use crate::backend::SavedItemsBackend;
use crate::cart::CartStore;
use crate::recently_viewed::RecentlyViewedStore;

/// Stores belonging to one shopper.
pub struct ShopperSession<B> {
    cart: CartStore<B>,
    recently_viewed: RecentlyViewedStore,
}

impl<B: SavedItemsBackend> ShopperSession<B> {
    /// Create a session with an empty cart and an empty recently viewed list.
    #[must_use]
    pub fn new(key: ShopperKey, backend: Arc<B>) -> Self {
        Self {
            cart: CartStore::new(key, backend),
            recently_viewed: RecentlyViewedStore::new(),
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore<B> {
        &self.cart
    }

    #[must_use]
    pub const fn recently_viewed(&self) -> &RecentlyViewedStore {
        &self.recently_viewed
    }
}

/// Registry of live shopper sessions.
///
/// Cheap to clone; clones share the same sessions.
pub struct SessionRegistry<B> {
    sessions: Cache<ShopperKey, Arc<ShopperSession<B>>>,
    backend: Arc<B>,
}

impl<B> Clone for SessionRegistry<B> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: SavedItemsBackend> SessionRegistry<B> {
    /// Create a registry.
    ///
    /// # Arguments
    ///
    /// * `backend` - Saved-items backend shared by every cart
    /// * `capacity` - Maximum number of live sessions
    /// * `idle` - How long an unused session is kept
    #[must_use]
    pub fn new(backend: Arc<B>, capacity: u64, idle: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(capacity)
            .time_to_idle(idle)
            .eviction_listener(
                |key: Arc<ShopperKey>, _: Arc<ShopperSession<B>>, cause: RemovalCause| {
                    debug!(shopper = %key, ?cause, "shopper session ended");
                },
            )
            .build();

        Self { sessions, backend }
    }

    /// Session for a shopper, creating it if needed.
    ///
    /// Concurrent calls for the same key share one session. A new session
    /// loads the shopper's stored saved lines; if that fails the saved list
    /// starts empty.
    #[instrument(skip(self))]
    pub async fn get_or_create(&self, key: &ShopperKey) -> Arc<ShopperSession<B>> {
        let backend = Arc::clone(&self.backend);
        let owned = key.clone();

        self.sessions
            .get_with_by_ref(key, async move {
                let session = ShopperSession::new(owned, backend);
                if let Err(error) = session.cart().restore_saved().await {
                    warn!(%error, "could not restore saved items, starting empty");
                }
                debug!("shopper session started");
                Arc::new(session)
            })
            .await
    }

    /// End a shopper's session. Handles already given out stay usable.
    pub async fn end(&self, key: &ShopperKey) {
        self.sessions.invalidate(key).await;
    }

    /// Number of live sessions.
    pub async fn active_sessions(&self) -> u64 {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count()
    }
}
