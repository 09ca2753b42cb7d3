//! Product catalog repository.

use bramble_core::{ColorVariant, Product, ProductId, recommendation_score};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use super::RepositoryError;

/// Columns selected for a full product record.
const PRODUCT_COLUMNS: &str = "id, name, price, description, features, materials, care, \
                               shipping, stock, colors, angle_images, image";

/// Repository for catalog reads and score maintenance.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    price: Decimal,
    description: String,
    features: Vec<String>,
    materials: String,
    care: String,
    shipping: String,
    stock: i32,
    colors: Json<Vec<ColorVariant>>,
    angle_images: Vec<String>,
    image: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            description: row.description,
            features: row.features,
            materials: row.materials,
            care: row.care,
            shipping: row.shipping,
            stock: row.stock,
            colors: row.colors.0,
            angle_images: row.angle_images,
            image: row.image,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ScoreInputRow {
    id: ProductId,
    view_count: i32,
    stock: i32,
    popularity: i32,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Count a product page view and return the product.
    ///
    /// Returns `None` without counting anything if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn record_view(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE storefront.product
            SET view_count = view_count + 1
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// List products, best recommendation score first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM storefront.product
            ORDER BY recommendation_score DESC, name ASC, id ASC
            LIMIT $1 OFFSET $2
            "
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Recompute every product's recommendation score.
    ///
    /// Runs in one transaction, so readers see either all old scores or all
    /// new ones. Returns the number of products updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails; nothing is
    /// written in that case.
    #[instrument(skip(self))]
    pub async fn recalculate_recommendation_scores(&self) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let inputs = sqlx::query_as::<_, ScoreInputRow>(
            r"
            SELECT id, view_count, stock, popularity
            FROM storefront.product
            ORDER BY id
            FOR UPDATE
            ",
        )
        .fetch_all(&mut *tx)
        .await?;

        let mut updated = 0;
        for input in &inputs {
            let score = recommendation_score(input.view_count, input.stock, input.popularity);
            updated += sqlx::query(
                "UPDATE storefront.product SET recommendation_score = $2 WHERE id = $1",
            )
            .bind(&input.id)
            .bind(score)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        tracing::info!(updated, "recommendation scores recalculated");
        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_product() {
        let row = ProductRow {
            id: ProductId::new("tee-olive"),
            name: "Olive Tee".to_string(),
            price: Decimal::new(2_450, 2),
            description: "Heavyweight cotton".to_string(),
            features: vec!["Organic".to_string()],
            materials: "100% cotton".to_string(),
            care: "Cold wash".to_string(),
            shipping: "Ships in 2 days".to_string(),
            stock: 4,
            colors: Json(vec![ColorVariant {
                name: "Olive".to_string(),
                hex: "#556b2f".to_string(),
                image: None,
            }]),
            angle_images: vec!["/img/tee-back.jpg".to_string()],
            image: "/img/tee.jpg".to_string(),
        };

        let product = Product::from(row);
        assert_eq!(product.id.as_str(), "tee-olive");
        assert_eq!(product.colors.len(), 1);
        assert!(product.in_stock());
    }

    #[test]
    fn test_column_list_matches_row() {
        for column in ["colors", "angle_images", "stock", "image"] {
            assert!(PRODUCT_COLUMNS.contains(column));
        }
    }
}
