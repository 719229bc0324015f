//! Shared domain model for the billiards hall engine
//!
//! Common types used by the engine crate and by consumers mapping the
//! in-process API onto a transport:
//!
//! - **models**: tables, products and bills
//! - **order**: order lifecycle state, line items, change notifications
//! - **util**: time helpers

pub mod models;
pub mod order;
pub mod util;

// Re-export commonly used types
pub use models::{
    Bill, BilliardTable, PaymentMethod, PaymentStatus, Product, ProductCreate, TableCreate,
    TableOverview, TableStatus,
};
pub use order::{Notification, Order, OrderItem, OrderStatus};
