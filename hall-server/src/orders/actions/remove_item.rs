//! RemoveItem command handler
//!
//! Deletes a line from an open order, returning its full quantity to
//! stock.

use tracing::debug;

use shared::order::{Notification, Order, OrderStatus};

use crate::orders::error::OrderError;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};
use crate::orders::{money, stock};

/// RemoveItem action
#[derive(Debug, Clone)]
pub struct RemoveItemAction {
    pub order_id: String,
    pub product_id: i64,
}

impl CommandHandler for RemoveItemAction {
    type Output = Order;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Order, OrderError> {
        // 1. Load the order; items only change while it is open
        let mut order = ctx.load_order(&self.order_id)?;
        if order.status != OrderStatus::Open {
            return Err(OrderError::InvalidStateTransition(format!(
                "Cannot remove items from order {} in {:?} status",
                self.order_id, order.status
            )));
        }

        // 2. Find the line
        let quantity = order
            .item(self.product_id)
            .map(|item| item.quantity)
            .ok_or(OrderError::ItemNotFound(self.product_id))?;

        // 3. Return the full line quantity to stock
        let mut product = ctx.load_product(self.product_id)?;
        stock::release(&mut product, quantity);

        // 4. Delete the line and recompute the total
        order.items.retain(|item| item.product_id != self.product_id);
        money::recalculate_total(&mut order);
        order.updated_at = metadata.timestamp;

        ctx.save_product(product);
        ctx.save_order(order.clone());
        ctx.notify(Notification::OrderUpdated {
            order: order.clone(),
        });

        debug!(
            order_id = %self.order_id,
            product_id = self.product_id,
            released = quantity,
            "Item removed"
        );
        Ok(order)
    }
}
