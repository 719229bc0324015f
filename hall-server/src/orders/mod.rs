//! Table / order / billing lifecycle engine
//!
//! This module implements the hall's core protocol: a table is opened and
//! starts the clock, consumables are added against inventory, and closing
//! produces a bill combining the item subtotal with the time-based play
//! fee.
//!
//! - **manager**: `OrdersManager` facade — one write transaction per command
//! - **actions**: one handler per lifecycle command
//! - **storage**: redb persistence for tables, products, orders and bills
//! - **money**: decimal arithmetic for totals and the play fee
//! - **stock**: inventory ledger guarding non-negative stock
//!
//! # Command Flow
//!
//! ```text
//! manager.add_item(order_id, product_id, qty)
//!     ├─ 1. Begin write transaction
//!     ├─ 2. Action validates lifecycle state
//!     ├─ 3. Stock ledger reserves inventory
//!     ├─ 4. Line upserted, total recomputed
//!     ├─ 5. Staged writes persisted (order + product together)
//!     ├─ 6. Commit (an error drops the transaction: full rollback)
//!     └─ 7. Broadcast notifications (best-effort)
//! ```

pub mod actions;
pub mod error;
pub mod manager;
pub mod money;
pub mod stock;
pub mod storage;
pub mod traits;

// Re-exports
pub use error::OrderError;
pub use manager::{ManagerError, ManagerResult, OrdersManager};
pub use storage::{OrderStorage, StorageError, StorageResult};

// Re-export shared types for convenience
pub use shared::order::{Notification, Order, OrderItem, OrderStatus};
