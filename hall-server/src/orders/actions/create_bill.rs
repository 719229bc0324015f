//! CreateBill command handler
//!
//! Finalizes an order: stops the clock if still running, adds the
//! time-based play fee to the item subtotal, marks the order paid and
//! issues the pending bill. One bill per order, ever.

use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use shared::models::{Bill, PaymentMethod};
use shared::order::{Notification, OrderStatus};

use crate::orders::error::OrderError;
use crate::orders::money;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};

use super::free_table_if_held;

/// CreateBill action
#[derive(Debug, Clone)]
pub struct CreateBillAction {
    pub order_id: String,
    pub payment_method: PaymentMethod,
    pub hourly_rate: Decimal,
}

impl CommandHandler for CreateBillAction {
    type Output = Bill;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Bill, OrderError> {
        // 1. Load the order and check billing preconditions
        let mut order = ctx.load_order(&self.order_id)?;
        match order.status {
            OrderStatus::Paid => {
                return Err(OrderError::Conflict(format!(
                    "Order {} is already paid",
                    self.order_id
                )));
            }
            OrderStatus::Cancelled => {
                return Err(OrderError::Conflict(format!(
                    "Order {} was cancelled and cannot be billed",
                    self.order_id
                )));
            }
            OrderStatus::Open | OrderStatus::WaitingPayment => {}
        }
        if let Some(existing) = ctx.bill_id_for_order(&self.order_id)? {
            return Err(OrderError::Conflict(format!(
                "Order {} already has a bill ({})",
                self.order_id, existing
            )));
        }

        // 2. Stop the clock if finish_playing/close did not already
        let end_time = order.end_time.unwrap_or(metadata.timestamp);
        order.end_time = Some(end_time);

        // 3. Final total = item subtotal + play fee for the elapsed time
        let play_fee = money::play_fee(order.start_time, end_time, self.hourly_rate);
        order.total_amount = money::items_subtotal(&order.items) + play_fee;

        // 4. Settle the order
        order.status = OrderStatus::Paid;
        order.updated_at = metadata.timestamp;

        // 5. Billing an order that was never closed must still release the table
        free_table_if_held(ctx, order.table_id, &order.order_id)?;

        // 6. Issue the pending bill, stamped with the session end time
        let bill = Bill::new(
            Uuid::new_v4().to_string(),
            order.order_id.clone(),
            order.total_amount,
            self.payment_method,
            end_time,
            metadata.timestamp,
        );

        ctx.save_order(order.clone());
        ctx.save_bill(bill.clone());
        ctx.notify(Notification::OrderUpdated { order });

        info!(
            bill_id = %bill.bill_id,
            order_id = %self.order_id,
            total = %bill.total_amount,
            "Bill created"
        );
        Ok(bill)
    }
}
