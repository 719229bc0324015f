//! CancelOrder command handler
//!
//! Abandons an active order: every line's stock is returned, the table is
//! freed and no bill is ever produced.

use tracing::info;

use shared::order::OrderStatus;

use crate::orders::error::OrderError;
use crate::orders::stock;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};

use super::free_table_if_held;

/// CancelOrder action
#[derive(Debug, Clone)]
pub struct CancelOrderAction {
    pub order_id: String,
}

impl CommandHandler for CancelOrderAction {
    type Output = ();

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<(), OrderError> {
        // 1. Load the order and gate on its lifecycle state
        let mut order = ctx.load_order(&self.order_id)?;
        match order.status {
            OrderStatus::Paid => {
                return Err(OrderError::Conflict(format!(
                    "Order {} is already paid and cannot be cancelled",
                    self.order_id
                )));
            }
            OrderStatus::Cancelled => {
                return Err(OrderError::InvalidStateTransition(format!(
                    "Order {} is already cancelled",
                    self.order_id
                )));
            }
            OrderStatus::Open | OrderStatus::WaitingPayment => {}
        }

        // 2. Return every reserved unit to stock
        for item in &order.items {
            let mut product = ctx.load_product(item.product_id)?;
            stock::release(&mut product, item.quantity);
            ctx.save_product(product);
        }

        // 3. Terminal state; keep the finish time if the clock was stopped
        order.status = OrderStatus::Cancelled;
        if order.end_time.is_none() {
            order.end_time = Some(metadata.timestamp);
        }
        order.updated_at = metadata.timestamp;

        // 4. Free the table if this order still holds it
        free_table_if_held(ctx, order.table_id, &order.order_id)?;

        ctx.save_order(order.clone());

        info!(order_id = %self.order_id, table_id = order.table_id, "Order cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::money;
    use crate::orders::storage::OrderStorage;
    use redb::WriteTransaction;
    use rust_decimal::Decimal;
    use shared::models::{BilliardTable, Product, TableStatus};
    use shared::order::{Order, OrderItem};

    fn create_test_metadata() -> CommandMetadata {
        CommandMetadata {
            timestamp: 1_234_567_890,
        }
    }

    fn seed(storage: &OrderStorage, txn: &WriteTransaction, status: OrderStatus) -> String {
        let table = BilliardTable {
            id: 1,
            number: 1,
            name: "Table 1".to_string(),
            capacity: 4,
            status: TableStatus::Occupied,
        };
        storage.store_table(txn, &table).unwrap();

        let product = Product {
            id: 1,
            name: "Cola".to_string(),
            price: Decimal::from(10_000),
            // Two units already reserved by the order below
            stock_quantity: 3,
        };
        storage.store_product(txn, &product).unwrap();

        let mut order = Order::new("order-1".to_string(), 1, 7, 1_000);
        order.status = status;
        order.items.push(OrderItem {
            product_id: 1,
            product_name: "Cola".to_string(),
            quantity: 2,
            unit_price: Decimal::from(10_000),
        });
        money::recalculate_total(&mut order);
        storage.store_order(txn, &order).unwrap();
        storage.set_table_order(txn, 1, &order.order_id).unwrap();
        order.order_id
    }

    #[test]
    fn test_cancel_releases_stock_and_frees_table() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed(&storage, &txn, OrderStatus::Open);

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = CancelOrderAction {
            order_id: order_id.clone(),
        };

        action.execute(&mut ctx, &create_test_metadata()).unwrap();

        let changes = ctx.into_changes();
        assert_eq!(changes.products[0].stock_quantity, 5);
        assert_eq!(changes.tables[0].status, TableStatus::Free);
        assert_eq!(changes.table_links, vec![(1, None)]);
        assert_eq!(changes.orders[0].status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_cancel_waiting_payment_order() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed(&storage, &txn, OrderStatus::WaitingPayment);

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = CancelOrderAction { order_id };

        assert!(action.execute(&mut ctx, &create_test_metadata()).is_ok());
    }

    #[test]
    fn test_cancel_paid_order_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed(&storage, &txn, OrderStatus::Paid);

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = CancelOrderAction { order_id };

        let result = action.execute(&mut ctx, &create_test_metadata());
        assert!(matches!(result, Err(OrderError::Conflict(_))));
    }

    #[test]
    fn test_cancel_cancelled_order_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed(&storage, &txn, OrderStatus::Cancelled);

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = CancelOrderAction { order_id };

        let result = action.execute(&mut ctx, &create_test_metadata());
        assert!(matches!(result, Err(OrderError::InvalidStateTransition(_))));
    }
}
