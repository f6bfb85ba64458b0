use rust_decimal::prelude::*;

use crate::models::OrderItem;

/// Current UTC timestamp (milliseconds)
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Rounding for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Convert f64 to Decimal; non-finite input becomes zero
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round a monetary amount to cents
pub fn round_money(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// Sum of `price * quantity` over the line items.
///
/// `None` when the sum does not fit in a `Decimal`.
pub fn items_total(items: &[OrderItem]) -> Option<f64> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |acc, i| {
            to_decimal(i.price)
                .checked_mul(Decimal::from(i.quantity))
                .and_then(|line| acc.checked_add(line))
        })
        .map(to_f64)
}

/// Compare two monetary amounts within one cent
pub fn money_eq(a: f64, b: f64) -> bool {
    to_decimal(a)
        .checked_sub(to_decimal(b))
        .is_some_and(|diff| diff.abs() < MONEY_TOLERANCE)
}
