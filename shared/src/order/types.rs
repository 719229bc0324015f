//! Order and line item types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order lifecycle status
///
/// Permitted transitions: `Open → WaitingPayment → Paid` and
/// `Open | WaitingPayment → Cancelled`. `Paid` and `Cancelled` are
/// terminal; the order becomes an immutable historical record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Table opened, clock running, items may still change
    #[default]
    Open,
    /// Play finished, awaiting settlement
    WaitingPayment,
    /// Billed and settled
    Paid,
    /// Abandoned without billing
    Cancelled,
}

/// A single product line within an order
///
/// `unit_price` is captured from the product when the line is created and
/// never re-read, so later catalog price changes leave open orders
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub order_id: String,
    pub table_id: i64,
    pub employee_id: i64,
    pub status: OrderStatus,
    /// At most one line per product; repeat additions increment quantity
    pub items: Vec<OrderItem>,
    /// Sum of line subtotals while the clock runs; items plus play fee once billed
    pub total_amount: Decimal,
    pub start_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Create a new open order with the clock started at `now`
    pub fn new(order_id: String, table_id: i64, employee_id: i64, now: i64) -> Self {
        Self {
            order_id,
            table_id,
            employee_id,
            status: OrderStatus::Open,
            items: Vec::new(),
            total_amount: Decimal::ZERO,
            start_time: now,
            end_time: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Open or awaiting payment — the one order, if any, tying up a table
    pub fn is_active(&self) -> bool {
        matches!(self.status, OrderStatus::Open | OrderStatus::WaitingPayment)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    /// Line for a product, if one exists
    pub fn item(&self, product_id: i64) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    pub fn item_mut(&mut self, product_id: i64) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|i| i.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_is_open_and_empty() {
        let order = Order::new("order-1".to_string(), 1, 7, 1_000);
        assert_eq!(order.status, OrderStatus::Open);
        assert!(order.items.is_empty());
        assert_eq!(order.total_amount, Decimal::ZERO);
        assert_eq!(order.start_time, 1_000);
        assert!(order.end_time.is_none());
        assert!(order.is_active());
        assert!(!order.is_terminal());
    }

    #[test]
    fn test_active_states() {
        let mut order = Order::new("order-1".to_string(), 1, 7, 0);
        order.status = OrderStatus::WaitingPayment;
        assert!(order.is_active());
        order.status = OrderStatus::Paid;
        assert!(!order.is_active());
        assert!(order.is_terminal());
        order.status = OrderStatus::Cancelled;
        assert!(!order.is_active());
        assert!(order.is_terminal());
    }
}
