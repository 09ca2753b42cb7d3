//! `PostgreSQL` saved-items backend.

use bramble_core::{CartItem, ProductId, Quantity, ShopperKey};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::{BackendError, SavedItemsBackend};

/// Saved lines stored in `storefront.saved_item`.
#[derive(Debug, Clone)]
pub struct PgSavedItems {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct SavedItemRow {
    product_id: ProductId,
    name: String,
    price: Decimal,
    image: String,
    quantity: i32,
    size: Option<String>,
}

impl TryFrom<SavedItemRow> for CartItem {
    type Error = BackendError;

    fn try_from(row: SavedItemRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::try_from(i64::from(row.quantity)).map_err(|e| {
            BackendError::Corrupt(format!("saved line {}: {e}", row.product_id))
        })?;

        Ok(Self {
            id: row.product_id,
            name: row.name,
            price: row.price,
            image: row.image,
            quantity,
            size: row.size,
        })
    }
}

impl PgSavedItems {
    /// Create a backend over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SavedItemsBackend for PgSavedItems {
    async fn save(&self, shopper: &ShopperKey, item: &CartItem) -> Result<(), BackendError> {
        let quantity = i32::try_from(item.quantity.get())
            .map_err(|_| BackendError::Rejected(format!("quantity too large for {}", item.id)))?;

        sqlx::query(
            r"
            INSERT INTO storefront.saved_item
                (shopper_key, product_id, name, price, image, quantity, size)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (shopper_key, product_id) DO UPDATE
            SET name = EXCLUDED.name,
                price = EXCLUDED.price,
                image = EXCLUDED.image,
                quantity = EXCLUDED.quantity,
                size = EXCLUDED.size,
                saved_at = NOW()
            ",
        )
        .bind(shopper)
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.price)
        .bind(&item.image)
        .bind(quantity)
        .bind(item.size.as_deref())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn remove(&self, shopper: &ShopperKey, id: &ProductId) -> Result<(), BackendError> {
        sqlx::query(
            r"
            DELETE FROM storefront.saved_item
            WHERE shopper_key = $1 AND product_id = $2
            ",
        )
        .bind(shopper)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn list(&self, shopper: &ShopperKey) -> Result<Vec<CartItem>, BackendError> {
        let rows = sqlx::query_as::<_, SavedItemRow>(
            r"
            SELECT product_id, name, price, image, quantity, size
            FROM storefront.saved_item
            WHERE shopper_key = $1
            ORDER BY saved_at ASC, product_id ASC
            ",
        )
        .bind(shopper)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(CartItem::try_from).collect()
    }
}

/// Translate a sqlx error into a message that is safe to show.
fn map_sqlx_error(error: sqlx::Error) -> BackendError {
    tracing::warn!(error = %error, "saved items query failed");
    match error {
        sqlx::Error::Database(db_err) => BackendError::Rejected(db_err.message().to_owned()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            BackendError::Corrupt("stored line could not be decoded".to_owned())
        }
        _ => BackendError::Unavailable("database unreachable".to_owned()),
    }
}
