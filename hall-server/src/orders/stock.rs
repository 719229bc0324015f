//! Stock ledger — inventory adjustments for order line mutations
//!
//! Every decrement is validated against available stock before it is
//! applied. The caller persists the product in the same transaction as the
//! order mutation, so both commit or neither does; stock can never go
//! negative.

use shared::models::Product;

use super::error::OrderError;

/// Apply a signed stock delta: positive consumes stock, negative returns it
pub fn adjust(product: &mut Product, diff: i64) -> Result<(), OrderError> {
    if diff > 0 && product.stock_quantity < diff {
        return Err(OrderError::InsufficientStock {
            product_id: product.id,
            available: product.stock_quantity,
            requested: diff,
        });
    }
    product.stock_quantity -= diff;
    Ok(())
}

/// Reserve stock for units added to an order
pub fn reserve(product: &mut Product, quantity: i32) -> Result<(), OrderError> {
    adjust(product, i64::from(quantity))
}

/// Return units to stock (removed lines, cancelled orders)
pub fn release(product: &mut Product, quantity: i32) {
    product.stock_quantity += i64::from(quantity);
}
