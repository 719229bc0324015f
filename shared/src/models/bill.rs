//! Bill Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Momo,
}

/// Bill settlement status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

/// The payable record produced when an order is billed
///
/// Created exactly once per order, never deleted. Distinct from the order
/// itself: the order tracks the session, the bill tracks the settlement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bill {
    pub bill_id: String,
    pub order_id: String,
    /// Item subtotal plus the time-based play fee
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// Stamped at issue; re-stamped once when payment is confirmed
    pub issued_at: i64,
    pub created_at: i64,
}

impl Bill {
    /// Create a pending bill
    pub fn new(
        bill_id: String,
        order_id: String,
        total_amount: Decimal,
        payment_method: PaymentMethod,
        issued_at: i64,
        created_at: i64,
    ) -> Self {
        Self {
            bill_id,
            order_id,
            total_amount,
            payment_method,
            payment_status: PaymentStatus::Pending,
            issued_at,
            created_at,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}
