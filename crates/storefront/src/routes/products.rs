//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use bramble_core::{Product, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::backend::SavedItemsBackend;
use crate::db::ProductRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::CurrentShopper;
use crate::state::AppState;

/// Products per page when the client does not ask.
const DEFAULT_PAGE_SIZE: u32 = 24;
const MAX_PAGE_SIZE: u32 = 100;

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PaginationQuery {
    /// `(limit, offset)` for the requested page. Pages start at 1.
    fn limit_offset(&self) -> (i64, i64) {
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let page = self.page.unwrap_or(1).max(1);
        let offset = i64::from(page - 1) * i64::from(per_page);
        (i64::from(per_page), offset)
    }
}

/// List products.
#[instrument(skip(state))]
pub async fn index<B: SavedItemsBackend>(
    State(state): State<AppState<B>>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Vec<Product>>> {
    let (limit, offset) = query.limit_offset();
    let products = ProductRepository::new(state.pool())
        .list(limit, offset)
        .await?;
    Ok(Json(products))
}

/// Show a product, counting the view and adding it to the shopper's
/// recently viewed list.
#[instrument(skip(state, shopper))]
pub async fn show<B: SavedItemsBackend>(
    State(state): State<AppState<B>>,
    CurrentShopper(shopper): CurrentShopper<B>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .record_view(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    shopper.recently_viewed().add(product.clone());
    add_breadcrumb("navigation", "Viewed product", Some(&[("product_id", id.as_str())]));

    Ok(Json(product))
}

/// The shopper's recently viewed products, most recent first.
#[instrument(skip_all)]
pub async fn recently_viewed<B: SavedItemsBackend>(
    CurrentShopper(shopper): CurrentShopper<B>,
) -> Json<Vec<Product>> {
    Json(shopper.recently_viewed().list())
}
