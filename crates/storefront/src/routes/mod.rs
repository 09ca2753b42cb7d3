//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness check
//! GET    /health/ready                - Readiness check (database)
//!
//! # Cart (JSON, scoped to the shopper session)
//! GET    /api/cart                    - Cart snapshot
//! POST   /api/cart/items              - Add one unit of a product
//! POST   /api/cart/products/{id}      - Add one unit of a catalog product
//! PATCH  /api/cart/items/{id}         - Set quantity (<= 0 removes)
//! DELETE /api/cart/items/{id}         - Remove a line
//! POST   /api/cart/items/{id}/save    - Save for later
//! POST   /api/cart/saved/{id}/move    - Move a saved line back to the cart
//! DELETE /api/cart/saved/{id}         - Delete a saved line
//!
//! # Session
//! DELETE /api/session                 - End the shopper's cart session
//!
//! # Products
//! GET    /api/products                - Product listing
//! GET    /api/products/{id}           - Product detail (counts the view)
//! GET    /api/recently-viewed         - Recently viewed products
//!
//! # Users
//! GET    /api/users/{user_id}/role    - Role lookup
//! ```

pub mod cart;
pub mod products;
pub mod session;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, post},
};

use crate::backend::SavedItemsBackend;
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes<B: SavedItemsBackend>() -> Router<AppState<B>> {
    Router::new()
        .route("/", get(cart::show::<B>))
        .route("/items", post(cart::add::<B>))
        .route("/products/{id}", post(cart::add_product::<B>))
        .route(
            "/items/{id}",
            patch(cart::update::<B>).delete(cart::remove::<B>),
        )
        .route("/items/{id}/save", post(cart::save_for_later::<B>))
        .route("/saved/{id}", delete(cart::remove_saved::<B>))
        .route("/saved/{id}/move", post(cart::move_to_cart::<B>))
}

/// Create the product routes router.
pub fn product_routes<B: SavedItemsBackend>() -> Router<AppState<B>> {
    Router::new()
        .route("/", get(products::index::<B>))
        .route("/{id}", get(products::show::<B>))
}

/// Create all routes for the storefront.
pub fn routes<B: SavedItemsBackend>() -> Router<AppState<B>> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness::<B>))
        .nest("/api/cart", cart_routes())
        .nest("/api/products", product_routes())
        .route("/api/session", delete(session::end::<B>))
        .route("/api/recently-viewed", get(products::recently_viewed::<B>))
        .route("/api/users/{user_id}/role", get(users::role::<B>))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness<B: SavedItemsBackend>(State(state): State<AppState<B>>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
