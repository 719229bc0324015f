//! SetTableStatus command handler
//!
//! Administrative status override, e.g. reserving a table ahead of a
//! booking. Occupancy is owned by the order lifecycle: `Occupied` cannot
//! be set here, and no override is allowed while an active order holds the
//! table.

use tracing::info;

use shared::models::{BilliardTable, TableStatus};
use shared::order::Notification;

use crate::orders::error::OrderError;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};

/// SetTableStatus action
#[derive(Debug, Clone)]
pub struct SetTableStatusAction {
    pub table_id: i64,
    pub status: TableStatus,
}

impl CommandHandler for SetTableStatusAction {
    type Output = BilliardTable;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> Result<BilliardTable, OrderError> {
        // 1. Occupied is only ever produced by opening the table
        if self.status == TableStatus::Occupied {
            return Err(OrderError::Conflict(
                "OCCUPIED is set by opening the table, not by override".to_string(),
            ));
        }

        // 2. Load the table and refuse to override a live session
        let mut table = ctx.load_table(self.table_id)?;
        if let Some(order_id) = ctx.order_for_table(self.table_id)? {
            return Err(OrderError::Conflict(format!(
                "Table {} has an active order ({})",
                table.name, order_id
            )));
        }

        // 3. Apply and notify
        table.status = self.status;
        ctx.save_table(table.clone());
        ctx.notify(Notification::TableStatus {
            table_id: self.table_id,
            status: self.status,
        });

        info!(table_id = self.table_id, status = ?self.status, "Table status overridden");
        Ok(table)
    }
}
