//! FinishPlaying command handler
//!
//! Stops the clock: the order moves from open to awaiting payment and the
//! end time is stamped. The table stays occupied until the order closes.

use tracing::info;

use shared::order::{Notification, Order, OrderStatus};

use crate::orders::error::OrderError;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};

/// FinishPlaying action
#[derive(Debug, Clone)]
pub struct FinishPlayingAction {
    pub order_id: String,
}

impl CommandHandler for FinishPlayingAction {
    type Output = Order;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Order, OrderError> {
        // 1. Load the order; only an open session can stop its clock
        let mut order = ctx.load_order(&self.order_id)?;
        if order.status != OrderStatus::Open {
            return Err(OrderError::InvalidStateTransition(format!(
                "Cannot finish playing for order {} in {:?} status",
                self.order_id, order.status
            )));
        }

        // 2. Stamp the end time and move to awaiting payment
        order.status = OrderStatus::WaitingPayment;
        order.end_time = Some(metadata.timestamp);
        order.updated_at = metadata.timestamp;

        ctx.save_order(order.clone());
        ctx.notify(Notification::OrderUpdated {
            order: order.clone(),
        });

        info!(order_id = %self.order_id, "Play finished, awaiting payment");
        Ok(order)
    }
}
