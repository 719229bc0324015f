//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity
///
/// The wider catalog (categories, images, descriptions) is managed
/// elsewhere; the engine owns the two fields the order lifecycle touches:
/// `price` is snapshotted onto order items at add time, `stock_quantity`
/// is mutated exclusively through the stock ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Current unit price
    pub price: Decimal,
    /// Units available; never negative
    pub stock_quantity: i64,
}

/// Register product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: i64,
}
