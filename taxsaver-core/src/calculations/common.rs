//! Shared arithmetic helpers for tax calculations.
//!
//! Calculations keep full precision end to end; [`round_half_up`] belongs at
//! display and storage boundaries only, so rounding error never compounds
//! across the baseline/optimized comparison.

use rust_decimal::Decimal;

/// Rounds a value to two decimal places, half-up (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use taxsaver_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(68.181818)), dec!(68.18));
/// assert_eq!(round_half_up(dec!(68.185)), dec!(68.19));
/// assert_eq!(round_half_up(dec!(-68.185)), dec!(-68.19)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the larger of two values.
///
/// ```
/// use rust_decimal_macros::dec;
/// use taxsaver_core::calculations::common::max;
///
/// assert_eq!(max(dec!(-1200), dec!(0)), dec!(0));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}
