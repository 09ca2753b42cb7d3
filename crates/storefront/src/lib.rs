//! Bramble storefront library.
//!
//! Shopper carts with save-for-later, recently viewed products, and the JSON
//! HTTP API that serves them. The binary in `main.rs` wires this to
//! `PostgreSQL` and Sentry; tests build the same router over in-memory stores.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod recently_viewed;
pub mod routes;
pub mod session;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionStore;

use backend::SavedItemsBackend;
use state::AppState;

/// Build the storefront router with sessions stored in `session_store`.
pub fn app<B, S>(state: AppState<B>, session_store: S) -> Router
where
    B: SavedItemsBackend,
    S: SessionStore + Clone,
{
    let session_layer = middleware::create_session_layer(session_store, state.config());

    routes::routes()
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
