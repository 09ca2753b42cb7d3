//! Line-item quantity type.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// The value is zero or negative.
    #[error("quantity must be at least 1 (got {0})")]
    NotPositive(i64),
    /// The value does not fit in a line quantity.
    #[error("quantity must be at most {max} (got {got})")]
    TooLarge {
        /// Largest accepted quantity.
        max: u32,
        /// Rejected input.
        got: i64,
    },
}

/// A cart line quantity.
///
/// ## Constraints
///
/// - Always at least 1; a zero quantity is represented by the line not existing
/// - At most `u32::MAX`; increments saturate instead of wrapping
///
/// ## Examples
///
/// ```
/// use bramble_core::Quantity;
///
/// assert_eq!(Quantity::ONE.get(), 1);
/// assert!(Quantity::try_from(0_i64).is_err());
/// assert_eq!(Quantity::try_from(3_i64).map(Quantity::get), Ok(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity from a `u32`, returning `None` for zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Get the quantity as a `u32`.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add one unit.
    #[must_use]
    pub const fn increment(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Combine two quantities of the same line.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0.get()))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value <= 0 {
            return Err(QuantityError::NotPositive(value));
        }

        u32::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(QuantityError::TooLarge {
                max: u32::MAX,
                got: value,
            })
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(
            Quantity::try_from(0_i64),
            Err(QuantityError::NotPositive(0))
        );
        assert_eq!(
            Quantity::try_from(-4_i64),
            Err(QuantityError::NotPositive(-4))
        );
    }

    #[test]
    fn test_rejects_too_large() {
        let too_big = i64::from(u32::MAX) + 1;
        assert!(matches!(
            Quantity::try_from(too_big),
            Err(QuantityError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_increment_saturates() {
        let max = Quantity::new(u32::MAX).unwrap();
        assert_eq!(max.increment().get(), u32::MAX);
        assert_eq!(Quantity::ONE.increment().get(), 2);
    }

    #[test]
    fn test_merge() {
        let two = Quantity::new(2).unwrap();
        let three = Quantity::new(3).unwrap();
        assert_eq!(two.merge(three).get(), 5);
    }

    #[test]
    fn test_serde_rejects_zero() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        let q: Quantity = serde_json::from_str("2").unwrap();
        assert_eq!(q.get(), 2);
        assert_eq!(serde_json::to_string(&q).unwrap(), "2");
    }
}
