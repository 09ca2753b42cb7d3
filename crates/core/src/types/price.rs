//! Display formatting for decimal amounts.

use rust_decimal::{Decimal, RoundingStrategy};

/// Format a decimal amount for display with exactly two decimal places.
///
/// Midpoints round away from zero.
///
/// ```
/// use bramble_core::format_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_amount(Decimal::new(10, 0)), "10.00");
/// assert_eq!(format_amount(Decimal::new(19_995, 3)), "20.00");
/// ```
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}
