//! Money arithmetic for order totals and the time-based play fee
//!
//! All calculations use `rust_decimal::Decimal`; floats never enter the
//! math, so totals match the exact sum of their parts.

use rust_decimal::{Decimal, RoundingStrategy};

use shared::order::{Order, OrderItem};

use super::error::OrderError;

/// Scale of the play-fee hour fraction
const HOUR_DECIMAL_PLACES: u32 = 2;

const MILLIS_PER_MINUTE: i64 = 60_000;
const MINUTES_PER_HOUR: i64 = 60;

/// Line subtotal: quantity × captured unit price
pub fn line_total(item: &OrderItem) -> Decimal {
    item.unit_price * Decimal::from(item.quantity)
}

/// Sum of line subtotals — the order total while the clock is running
pub fn items_subtotal(items: &[OrderItem]) -> Decimal {
    items.iter().map(line_total).sum()
}

/// Recompute an order's total from its current lines
pub fn recalculate_total(order: &mut Order) {
    order.total_amount = items_subtotal(&order.items);
}

/// Time-based usage fee between `start_ms` and `end_ms`
///
/// Whole elapsed minutes are counted with a one-minute floor; the hour
/// fraction is rounded up to two decimal places before multiplying by the
/// hourly rate.
pub fn play_fee(start_ms: i64, end_ms: i64, hourly_rate: Decimal) -> Decimal {
    let mut minutes = (end_ms - start_ms) / MILLIS_PER_MINUTE;
    if minutes <= 0 {
        minutes = 1;
    }

    let hours = (Decimal::from(minutes) / Decimal::from(MINUTES_PER_HOUR))
        .round_dp_with_strategy(HOUR_DECIMAL_PLACES, RoundingStrategy::AwayFromZero);

    hourly_rate * hours
}

/// Quantity must be a positive integer
pub fn validate_quantity(quantity: i32) -> Result<(), OrderError> {
    if quantity <= 0 {
        return Err(OrderError::Validation(format!(
            "quantity must be positive, got {quantity}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE_MS: i64 = 60_000;

    fn item(product_id: i64, price: i64, quantity: i32) -> OrderItem {
        OrderItem {
            product_id,
            product_name: format!("product-{product_id}"),
            quantity,
            unit_price: Decimal::from(price),
        }
    }

    #[test]
    fn test_items_subtotal_is_exact_sum() {
        let items = vec![item(1, 15_000, 2), item(2, 8_000, 3)];
        assert_eq!(items_subtotal(&items), Decimal::from(54_000));
    }

    #[test]
    fn test_subtotal_of_no_items_is_zero() {
        assert_eq!(items_subtotal(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_play_fee_ninety_minutes() {
        // 90 minutes → 1.50 hours → 90 000 at 60 000/h
        let fee = play_fee(0, 90 * MINUTE_MS, Decimal::from(60_000));
        assert_eq!(fee, Decimal::from(90_000));
    }

    #[test]
    fn test_play_fee_rounds_hours_up() {
        // 61 minutes → 61/60 = 1.0166.. → 1.02 hours → 61 200
        let fee = play_fee(0, 61 * MINUTE_MS, Decimal::from(60_000));
        assert_eq!(fee, Decimal::from(61_200));
    }

    #[test]
    fn test_play_fee_minimum_one_minute() {
        // 10 seconds of play still bills one minute: 1/60 → 0.02 hours
        let fee = play_fee(0, 10_000, Decimal::from(60_000));
        assert_eq!(fee, Decimal::from(1_200));
    }

    #[test]
    fn test_play_fee_partial_minute_does_not_bill() {
        // 90 minutes and 59 seconds still bills 90 whole minutes
        let fee = play_fee(0, 90 * MINUTE_MS + 59_000, Decimal::from(60_000));
        assert_eq!(fee, Decimal::from(90_000));
    }

    #[test]
    fn test_play_fee_end_before_start_clamps() {
        let fee = play_fee(100_000, 0, Decimal::from(60_000));
        assert_eq!(fee, Decimal::from(1_200));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(matches!(
            validate_quantity(0),
            Err(OrderError::Validation(_))
        ));
        assert!(matches!(
            validate_quantity(-3),
            Err(OrderError::Validation(_))
        ));
    }
}
