//! OpenTable command handler
//!
//! Creates a new order for a free table and flips the table to occupied.

use tracing::info;
use uuid::Uuid;

use shared::models::TableStatus;
use shared::order::{Notification, Order};

use crate::orders::error::OrderError;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};

/// OpenTable action
#[derive(Debug, Clone)]
pub struct OpenTableAction {
    pub table_id: i64,
    pub employee_id: i64,
}

impl CommandHandler for OpenTableAction {
    type Output = Order;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Order, OrderError> {
        // 1. Load the table and validate it is free
        let mut table = ctx.load_table(self.table_id)?;
        if table.status != TableStatus::Free {
            return Err(OrderError::Conflict(format!(
                "Table {} is not free ({:?})",
                table.name, table.status
            )));
        }

        // 2. The occupancy index is authoritative for the active-order
        //    linkage; a stale Free status must not slip a second order in
        if let Some(existing) = ctx.order_for_table(self.table_id)? {
            return Err(OrderError::Conflict(format!(
                "Table {} is already occupied (order: {})",
                table.name, existing
            )));
        }

        // 3. Create the order with the clock started
        let order_id = Uuid::new_v4().to_string();
        let order = Order::new(
            order_id.clone(),
            self.table_id,
            self.employee_id,
            metadata.timestamp,
        );

        // 4. Occupy the table and link the active order
        table.status = TableStatus::Occupied;
        ctx.save_table(table);
        ctx.occupy_table(self.table_id, &order_id);
        ctx.save_order(order.clone());

        // 5. Queue notifications
        ctx.notify(Notification::TableStatus {
            table_id: self.table_id,
            status: TableStatus::Occupied,
        });
        ctx.notify(Notification::OrderUpdated {
            order: order.clone(),
        });

        info!(order_id = %order.order_id, table_id = self.table_id, "Table opened");
        Ok(order)
    }
}
