//! Minor-unit money amounts.
//!
//! All balance arithmetic happens on `i64` minor units (cents). Conversion to
//! a major-unit [`Decimal`] exists only for presentation.

use rust_decimal::Decimal;

/// Amount in minor currency units (e.g. cents).
pub type MinorUnits = i64;

/// Number of minor units per major unit used when formatting, as a power of ten.
pub const DEFAULT_SCALE: u32 = 2;

/// Convert a minor-unit amount into a major-unit decimal.
///
/// # Examples
///
/// ```
/// use balance_engine::core::amount::to_major;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(to_major(1234, 2), dec!(12.34));
/// assert_eq!(to_major(-5, 2), dec!(-0.05));
/// ```
pub fn to_major(amount: MinorUnits, scale: u32) -> Decimal {
    Decimal::new(amount, scale)
}

/// Format a minor-unit amount with the default two-digit scale.
pub fn format_minor(amount: MinorUnits) -> String {
    to_major(amount, DEFAULT_SCALE).to_string()
}

/// Sum amounts, returning `None` on overflow.
pub fn checked_sum<I>(amounts: I) -> Option<MinorUnits>
where
    I: IntoIterator<Item = MinorUnits>,
{
    amounts
        .into_iter()
        .try_fold(0i64, |acc, amount| acc.checked_add(amount))
}
