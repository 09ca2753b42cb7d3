//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::backend::{PgSavedItems, SavedItemsBackend};
use crate::config::StorefrontConfig;
use crate::session::SessionRegistry;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections, configuration and the
/// shopper session registry. The saved-items backend defaults to
/// `PostgreSQL`.
pub struct AppState<B = PgSavedItems> {
    inner: Arc<AppStateInner<B>>,
}

struct AppStateInner<B> {
    config: StorefrontConfig,
    pool: PgPool,
    sessions: SessionRegistry<B>,
}

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl AppState {
    /// Create application state with saved items stored in `pool`.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let backend = Arc::new(PgSavedItems::new(pool.clone()));
        Self::with_backend(config, pool, backend)
    }
}

impl<B: SavedItemsBackend> AppState<B> {
    /// Create application state with a specific saved-items backend.
    #[must_use]
    pub fn with_backend(config: StorefrontConfig, pool: PgPool, backend: Arc<B>) -> Self {
        let sessions = SessionRegistry::new(
            backend,
            config.sessions.capacity,
            config.sessions.idle_timeout,
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                sessions,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the shopper session registry.
    #[must_use]
    pub fn sessions(&self) -> &SessionRegistry<B> {
        &self.inner.sessions
    }
}
