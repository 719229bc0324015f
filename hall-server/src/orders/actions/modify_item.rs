//! ModifyItem command handler
//!
//! Changes a line's quantity on an open order. The stock delta is the
//! signed difference, so lowering a quantity returns units to stock.

use tracing::debug;

use shared::order::{Notification, Order, OrderStatus};

use crate::orders::error::OrderError;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};
use crate::orders::{money, stock};

/// ModifyItem action
#[derive(Debug, Clone)]
pub struct ModifyItemAction {
    pub order_id: String,
    pub product_id: i64,
    pub new_quantity: i32,
}

impl CommandHandler for ModifyItemAction {
    type Output = Order;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Order, OrderError> {
        // 1. Lines hold positive quantities; removal is a separate command
        money::validate_quantity(self.new_quantity)?;

        // 2. Load the order; items only change while it is open
        let mut order = ctx.load_order(&self.order_id)?;
        if order.status != OrderStatus::Open {
            return Err(OrderError::InvalidStateTransition(format!(
                "Cannot modify items of order {} in {:?} status",
                self.order_id, order.status
            )));
        }

        // 3. Find the line
        let current_quantity = order
            .item(self.product_id)
            .map(|item| item.quantity)
            .ok_or(OrderError::ItemNotFound(self.product_id))?;

        // 4. Apply the signed stock delta; a negative diff returns stock
        let diff = i64::from(self.new_quantity) - i64::from(current_quantity);
        let mut product = ctx.load_product(self.product_id)?;
        stock::adjust(&mut product, diff)?;

        // 5. Update the line and recompute the total
        if let Some(item) = order.item_mut(self.product_id) {
            item.quantity = self.new_quantity;
        }
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
            new_quantity = self.new_quantity,
            diff,
            "Item quantity changed"
        );
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::storage::OrderStorage;
    use redb::WriteTransaction;
    use rust_decimal::Decimal;
    use shared::models::Product;
    use shared::order::OrderItem;

    fn create_test_metadata() -> CommandMetadata {
        CommandMetadata {
            timestamp: 1_234_567_890,
        }
    }

    fn seed(
        storage: &OrderStorage,
        txn: &WriteTransaction,
        status: OrderStatus,
        quantity: i32,
        stock: i64,
    ) -> String {
        let mut order = Order::new("order-1".to_string(), 1, 7, 1_000);
        order.status = status;
        order.items.push(OrderItem {
            product_id: 1,
            product_name: "Cola".to_string(),
            quantity,
            unit_price: Decimal::from(10_000),
        });
        money::recalculate_total(&mut order);
        storage.store_order(txn, &order).unwrap();

        let product = Product {
            id: 1,
            name: "Cola".to_string(),
            price: Decimal::from(10_000),
            stock_quantity: stock,
        };
        storage.store_product(txn, &product).unwrap();
        order.order_id
    }

    #[test]
    fn test_increase_quantity_consumes_stock() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed(&storage, &txn, OrderStatus::Open, 2, 5);

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = ModifyItemAction {
            order_id,
            product_id: 1,
            new_quantity: 4,
        };

        let order = action.execute(&mut ctx, &create_test_metadata()).unwrap();
        assert_eq!(order.items[0].quantity, 4);
        assert_eq!(order.total_amount, Decimal::from(40_000));

        let changes = ctx.into_changes();
        assert_eq!(changes.products[0].stock_quantity, 3);
    }

    #[test]
    fn test_decrease_quantity_returns_stock() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed(&storage, &txn, OrderStatus::Open, 4, 0);

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = ModifyItemAction {
            order_id,
            product_id: 1,
            new_quantity: 1,
        };

        let order = action.execute(&mut ctx, &create_test_metadata()).unwrap();
        assert_eq!(order.items[0].quantity, 1);
        assert_eq!(order.total_amount, Decimal::from(10_000));

        let changes = ctx.into_changes();
        assert_eq!(changes.products[0].stock_quantity, 3);
    }

    #[test]
    fn test_unchanged_quantity_is_a_no_op_delta() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed(&storage, &txn, OrderStatus::Open, 2, 5);

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = ModifyItemAction {
            order_id,
            product_id: 1,
            new_quantity: 2,
        };

        let order = action.execute(&mut ctx, &create_test_metadata()).unwrap();
        assert_eq!(order.items[0].quantity, 2);

        let changes = ctx.into_changes();
        assert_eq!(changes.products[0].stock_quantity, 5);
    }

    #[test]
    fn test_increase_beyond_stock_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed(&storage, &txn, OrderStatus::Open, 2, 1);

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = ModifyItemAction {
            order_id,
            product_id: 1,
            new_quantity: 4,
        };

        let result = action.execute(&mut ctx, &create_test_metadata());
        assert!(matches!(
            result,
            Err(OrderError::InsufficientStock {
                available: 1,
                requested: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed(&storage, &txn, OrderStatus::Open, 2, 5);

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = ModifyItemAction {
            order_id,
            product_id: 1,
            new_quantity: 0,
        };

        let result = action.execute(&mut ctx, &create_test_metadata());
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[test]
    fn test_modify_on_waiting_payment_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed(&storage, &txn, OrderStatus::WaitingPayment, 2, 5);

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = ModifyItemAction {
            order_id,
            product_id: 1,
            new_quantity: 3,
        };

        let result = action.execute(&mut ctx, &create_test_metadata());
        assert!(matches!(result, Err(OrderError::InvalidStateTransition(_))));
    }

    #[test]
    fn test_modify_missing_line_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed(&storage, &txn, OrderStatus::Open, 2, 5);

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = ModifyItemAction {
            order_id,
            product_id: 42,
            new_quantity: 1,
        };

        let result = action.execute(&mut ctx, &create_test_metadata());
        assert!(matches!(result, Err(OrderError::ItemNotFound(42))));
    }
}
