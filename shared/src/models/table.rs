//! Billiard Table Model

use serde::{Deserialize, Serialize};

/// Table occupancy status
///
/// `Occupied` is only ever produced by opening the table; it always goes
/// hand in hand with exactly one active order holding the table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    #[default]
    Free,
    Occupied,
    Reserved,
}

/// Billiard table entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BilliardTable {
    pub id: i64,
    pub number: i32,
    pub name: String,
    pub capacity: i32,
    pub status: TableStatus,
}

/// Create table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCreate {
    pub number: i32,
    pub name: String,
    pub capacity: Option<i32>,
}

/// Table listing entry for the floor view
///
/// Occupied tables carry their active order id and the time the clock
/// started, so a front desk can show running sessions at a glance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableOverview {
    pub id: i64,
    pub number: i32,
    pub name: String,
    pub capacity: i32,
    pub status: TableStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
}
