//! Order domain
//!
//! Lifecycle state, line items and the change notifications the engine
//! broadcasts after each committed mutation.

pub mod notification;
pub mod types;

pub use notification::Notification;
pub use types::{Order, OrderItem, OrderStatus};
