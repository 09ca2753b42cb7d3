//! Recommendation scoring.
//!
//! The score weighs how often a product is viewed, how much of it is on hand,
//! and how often it is bought, equally. It is recomputed in batch by
//! `bramble recommendations recalculate`.

/// Compute a product's recommendation score.
///
/// The mean of `views`, `stock` and `popularity`, rounded down. Negative inputs
/// (oversold stock, for instance) count as zero.
///
/// ```
/// use bramble_core::recommendation_score;
///
/// assert_eq!(recommendation_score(10, 5, 3), 6);
/// assert_eq!(recommendation_score(1, 1, 0), 0);
/// ```
#[must_use]
pub fn recommendation_score(views: i32, stock: i32, popularity: i32) -> i32 {
    let sum = i64::from(views.max(0)) + i64::from(stock.max(0)) + i64::from(popularity.max(0));
    // The mean of three i32 values always fits in an i32
    i32::try_from(sum / 3).unwrap_or(i32::MAX)
}
