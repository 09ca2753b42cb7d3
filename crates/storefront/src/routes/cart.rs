//! Cart route handlers.
//!
//! Every handler answers with the shopper's cart snapshot after the change,
//! so clients can re-render both lists and the total from one response.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bramble_core::{NewCartItem, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::backend::SavedItemsBackend;
use crate::cart::CartSnapshot;
use crate::db::ProductRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::CurrentShopper;
use crate::state::AppState;

/// Quantity update payload.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    /// New quantity; zero or less removes the line.
    pub quantity: i64,
}

/// Catalog add payload.
#[derive(Debug, Deserialize)]
pub struct AddProductRequest {
    /// Selected size, if the product has sizes.
    #[serde(default)]
    pub size: Option<String>,
}

/// Show the cart.
#[instrument(skip_all)]
pub async fn show<B: SavedItemsBackend>(
    CurrentShopper(shopper): CurrentShopper<B>,
) -> Result<Json<CartSnapshot>> {
    Ok(Json(shopper.cart().snapshot()?))
}

/// Add one unit of a product.
#[instrument(skip_all, fields(product_id = %item.id))]
pub async fn add<B: SavedItemsBackend>(
    CurrentShopper(shopper): CurrentShopper<B>,
    Json(item): Json<NewCartItem>,
) -> Result<(StatusCode, Json<CartSnapshot>)> {
    let id = item.id.clone();
    let outcome = shopper.cart().add_item(item).await?;
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));
    tracing::debug!(?outcome, "cart item added");

    Ok((StatusCode::CREATED, Json(shopper.cart().snapshot()?)))
}

/// Add one unit of a catalog product, priced from the catalog.
#[instrument(skip(state, shopper, request), fields(product_id = %id))]
pub async fn add_product<B: SavedItemsBackend>(
    State(state): State<AppState<B>>,
    CurrentShopper(shopper): CurrentShopper<B>,
    Path(id): Path<ProductId>,
    Json(request): Json<AddProductRequest>,
) -> Result<(StatusCode, Json<CartSnapshot>)> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    if !product.in_stock() {
        return Err(AppError::BadRequest(format!("{id} is out of stock")));
    }

    shopper
        .cart()
        .add_item(product.to_cart_item(request.size))
        .await?;
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));

    Ok((StatusCode::CREATED, Json(shopper.cart().snapshot()?)))
}

/// Set a line's quantity.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn update<B: SavedItemsBackend>(
    CurrentShopper(shopper): CurrentShopper<B>,
    Path(id): Path<ProductId>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartSnapshot>> {
    shopper.cart().update_quantity(&id, request.quantity)?;
    Ok(Json(shopper.cart().snapshot()?))
}

/// Remove a line.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn remove<B: SavedItemsBackend>(
    CurrentShopper(shopper): CurrentShopper<B>,
    Path(id): Path<ProductId>,
) -> Result<Json<CartSnapshot>> {
    shopper.cart().remove_item(&id)?;
    Ok(Json(shopper.cart().snapshot()?))
}

/// Move a line to the saved-for-later list.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn save_for_later<B: SavedItemsBackend>(
    CurrentShopper(shopper): CurrentShopper<B>,
    Path(id): Path<ProductId>,
) -> Result<Json<CartSnapshot>> {
    shopper.cart().save_for_later(&id).await?;
    add_breadcrumb("cart", "Saved for later", Some(&[("product_id", id.as_str())]));
    Ok(Json(shopper.cart().snapshot()?))
}

/// Move a saved line back into the cart.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn move_to_cart<B: SavedItemsBackend>(
    CurrentShopper(shopper): CurrentShopper<B>,
    Path(id): Path<ProductId>,
) -> Result<Json<CartSnapshot>> {
    shopper.cart().move_to_cart(&id).await?;
    add_breadcrumb("cart", "Moved to cart", Some(&[("product_id", id.as_str())]));
    Ok(Json(shopper.cart().snapshot()?))
}

/// Delete a saved line.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn remove_saved<B: SavedItemsBackend>(
    CurrentShopper(shopper): CurrentShopper<B>,
    Path(id): Path<ProductId>,
) -> Result<Json<CartSnapshot>> {
    shopper.cart().remove_saved_item(&id).await?;
    Ok(Json(shopper.cart().snapshot()?))
}
