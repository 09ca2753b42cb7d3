//! Cart line types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::quantity::Quantity;

/// Largest accepted unit price, `9999999999.99`.
///
/// This is the range of the `NUMERIC(12, 2)` price columns.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// A line in the active cart or the saved-for-later list.
///
/// Lines are keyed by [`ProductId`] alone. `size` is carried along for display
/// but two lines for the same product with different sizes are the same line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identity.
    pub id: ProductId,
    /// Product name at the time it was added.
    pub name: String,
    /// Unit price.
    pub price: Decimal,
    /// Image URL.
    pub image: String,
    /// Number of units.
    pub quantity: Quantity,
    /// Selected size, if the product has sizes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl CartItem {
    /// Price of the whole line (`price * quantity`), `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity.get()))
    }
}

/// A product being added to the cart, before it has a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    #[serde(default)]
    pub size: Option<String>,
}

impl NewCartItem {
    /// Whether the unit price lies between zero and [`MAX_UNIT_PRICE`].
    #[must_use]
    pub fn has_valid_price(&self) -> bool {
        self.price >= Decimal::ZERO && self.price <= MAX_UNIT_PRICE
    }

    /// Turn into a cart line with the given quantity.
    #[must_use]
    pub fn with_quantity(self, quantity: Quantity) -> CartItem {
        CartItem {
            id: self.id,
            name: self.name,
            price: self.price,
            image: self.image,
            quantity,
            size: self.size,
        }
    }
}
