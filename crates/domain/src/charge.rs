//! Charge computation for service orders.

use rust_decimal::{Decimal, RoundingStrategy};

/// Computes the charge for an order: `rate / 1000 * quantity`, rounded
/// to 4 decimal places.
///
/// Rates are quoted per 1000 units, so a rate of 10 and a quantity of
/// 1000 charges exactly 10.0000.
pub fn compute(rate: Decimal, quantity: u32) -> Decimal {
    (rate / Decimal::from(1000) * Decimal::from(quantity))
        .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}
