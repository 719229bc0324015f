//! Domain error taxonomy for lifecycle commands
//!
//! All variants are synchronous, local failures surfaced to the caller
//! before any state change commits; the engine never retries on its own.

use thiserror::Error;

use super::storage::StorageError;

/// Errors returned by lifecycle commands
#[derive(Debug, Error)]
pub enum OrderError {
    /// Malformed input, rejected before touching any entity
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Entity state precondition violated (occupied table, double billing, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Operation not legal for the current lifecycle state
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Stock would go negative
    #[error(
        "Insufficient stock for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    #[error("Table not found: {0}")]
    TableNotFound(i64),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    #[error("Bill not found: {0}")]
    BillNotFound(String),

    /// No line for this product on the order
    #[error("Order item not found: product {0}")]
    ItemNotFound(i64),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for OrderError {
    fn from(err: StorageError) -> Self {
        OrderError::Storage(err.to_string())
    }
}
