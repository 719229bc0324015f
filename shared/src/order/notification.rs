//! Notification port payloads
//!
//! Lifecycle and occupancy changes are broadcast to whoever subscribes;
//! the actual push channel to connected clients lives outside this crate.
//! Delivery is best-effort: the engine never fails or blocks a committed
//! command on a send.

use serde::{Deserialize, Serialize};

use crate::models::TableStatus;

use super::types::Order;

/// Broadcast payload emitted after a committed mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Notification {
    /// An order changed: items, totals or lifecycle status
    OrderUpdated { order: Order },
    /// A table changed occupancy status
    TableStatus { table_id: i64, status: TableStatus },
}
