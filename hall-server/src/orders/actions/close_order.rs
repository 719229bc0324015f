//! CloseOrder command handler
//!
//! Ends the table session: stops the clock if still running, moves the
//! order to awaiting payment and frees the table. Settlement itself is the
//! billing engine's step — the order is not marked paid here.

use tracing::info;

use shared::order::{Notification, Order, OrderStatus};

use crate::orders::error::OrderError;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};

use super::free_table_if_held;

/// CloseOrder action
#[derive(Debug, Clone)]
pub struct CloseOrderAction {
    pub order_id: String,
}

impl CommandHandler for CloseOrderAction {
    type Output = Order;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Order, OrderError> {
        // 1. Load the order; closing is legal from open or awaiting payment
        let mut order = ctx.load_order(&self.order_id)?;
        match order.status {
            OrderStatus::Open | OrderStatus::WaitingPayment => {}
            OrderStatus::Paid | OrderStatus::Cancelled => {
                return Err(OrderError::InvalidStateTransition(format!(
                    "Cannot close order {} in {:?} status",
                    self.order_id, order.status
                )));
            }
        }

        // 2. Stop the clock if finish_playing did not already
        if order.end_time.is_none() {
            order.end_time = Some(metadata.timestamp);
        }
        if order.status == OrderStatus::Open {
            order.status = OrderStatus::WaitingPayment;
        }
        order.updated_at = metadata.timestamp;

        // 3. Free the table; the order no longer ties it up
        free_table_if_held(ctx, order.table_id, &order.order_id)?;

        ctx.save_order(order.clone());
        ctx.notify(Notification::OrderUpdated {
            order: order.clone(),
        });

        info!(order_id = %self.order_id, table_id = order.table_id, "Order closed, ready for billing");
        Ok(order)
    }
}
