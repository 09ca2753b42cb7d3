//! Catalog product record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::NewCartItem;
use super::id::ProductId;

/// A catalog product as shown on the product page.
///
/// This is the record kept in the recently-viewed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub materials: String,
    #[serde(default)]
    pub care: String,
    #[serde(default)]
    pub shipping: String,
    /// Units in stock.
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub colors: Vec<ColorVariant>,
    /// Alternate photos (front, back, detail...).
    #[serde(default)]
    pub angle_images: Vec<String>,
    /// Primary image URL.
    pub image: String,
}

/// A color option for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorVariant {
    pub name: String,
    /// CSS color value, e.g. `#556b2f`.
    pub hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Product {
    /// Whether at least one unit is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Build the cart payload for this product in the given size.
    #[must_use]
    pub fn to_cart_item(&self, size: Option<String>) -> NewCartItem {
        NewCartItem {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
            size,
        }
    }
}
