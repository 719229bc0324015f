//! AddItem command handler
//!
//! Adds units of a product to an open order, reserving stock and
//! recomputing the total in the same transaction.

use tracing::debug;

use shared::order::{Notification, Order, OrderItem, OrderStatus};

use crate::orders::error::OrderError;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};
use crate::orders::{money, stock};

/// AddItem action
#[derive(Debug, Clone)]
pub struct AddItemAction {
    pub order_id: String,
    pub product_id: i64,
    pub quantity: i32,
}

impl CommandHandler for AddItemAction {
    type Output = Order;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Order, OrderError> {
        // 1. Reject non-positive quantities before touching any entity
        money::validate_quantity(self.quantity)?;

        // 2. Load the order; items only change while it is open
        let mut order = ctx.load_order(&self.order_id)?;
        if order.status != OrderStatus::Open {
            return Err(OrderError::InvalidStateTransition(format!(
                "Cannot add items to order {} in {:?} status",
                self.order_id, order.status
            )));
        }

        // 3. Reserve stock; failure rolls the whole command back
        let mut product = ctx.load_product(self.product_id)?;
        stock::reserve(&mut product, self.quantity)?;

        // 4. One line per product: increment an existing line, otherwise
        //    capture the current price onto a new one
        match order
            .items
            .iter()
            .position(|item| item.product_id == self.product_id)
        {
            Some(idx) => order.items[idx].quantity += self.quantity,
            None => order.items.push(OrderItem {
                product_id: product.id,
                product_name: product.name.clone(),
                quantity: self.quantity,
                unit_price: product.price,
            }),
        }

        // 5. Recompute the running total
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
            quantity = self.quantity,
            "Item added"
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

    fn create_test_metadata() -> CommandMetadata {
        CommandMetadata {
            timestamp: 1_234_567_890,
        }
    }

    fn seed_order(storage: &OrderStorage, txn: &WriteTransaction, status: OrderStatus) -> String {
        let mut order = Order::new("order-1".to_string(), 1, 7, 1_000);
        order.status = status;
        storage.store_order(txn, &order).unwrap();
        order.order_id
    }

    fn seed_product(
        storage: &OrderStorage,
        txn: &WriteTransaction,
        id: i64,
        price: i64,
        stock: i64,
    ) {
        let product = Product {
            id,
            name: format!("product-{id}"),
            price: Decimal::from(price),
            stock_quantity: stock,
        };
        storage.store_product(txn, &product).unwrap();
    }

    #[test]
    fn test_add_item_creates_line_and_reserves_stock() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed_order(&storage, &txn, OrderStatus::Open);
        seed_product(&storage, &txn, 1, 15_000, 10);

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = AddItemAction {
            order_id,
            product_id: 1,
            quantity: 2,
        };

        let order = action.execute(&mut ctx, &create_test_metadata()).unwrap();

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].unit_price, Decimal::from(15_000));
        assert_eq!(order.total_amount, Decimal::from(30_000));

        let changes = ctx.into_changes();
        assert_eq!(changes.products[0].stock_quantity, 8);
    }

    #[test]
    fn test_add_same_product_increments_line() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed_order(&storage, &txn, OrderStatus::Open);
        seed_product(&storage, &txn, 1, 15_000, 10);

        let mut ctx = CommandContext::new(&txn, &storage);
        let metadata = create_test_metadata();

        let action = AddItemAction {
            order_id: order_id.clone(),
            product_id: 1,
            quantity: 2,
        };
        action.execute(&mut ctx, &metadata).unwrap();

        let action = AddItemAction {
            order_id,
            product_id: 1,
            quantity: 3,
        };
        let order = action.execute(&mut ctx, &metadata).unwrap();

        // Still one line, quantity accumulated
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 5);
        assert_eq!(order.total_amount, Decimal::from(75_000));

        let changes = ctx.into_changes();
        assert_eq!(changes.products[0].stock_quantity, 5);
    }

    #[test]
    fn test_price_captured_at_first_add() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed_order(&storage, &txn, OrderStatus::Open);
        seed_product(&storage, &txn, 1, 15_000, 10);

        let mut ctx = CommandContext::new(&txn, &storage);
        let metadata = create_test_metadata();

        let action = AddItemAction {
            order_id: order_id.clone(),
            product_id: 1,
            quantity: 1,
        };
        action.execute(&mut ctx, &metadata).unwrap();

        // Catalog price changes after the line was created
        let mut product = ctx.load_product(1).unwrap();
        product.price = Decimal::from(99_000);
        ctx.save_product(product);

        let action = AddItemAction {
            order_id,
            product_id: 1,
            quantity: 1,
        };
        let order = action.execute(&mut ctx, &metadata).unwrap();

        // The captured unit price still applies
        assert_eq!(order.items[0].unit_price, Decimal::from(15_000));
        assert_eq!(order.total_amount, Decimal::from(30_000));
    }

    #[test]
    fn test_add_item_insufficient_stock_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed_order(&storage, &txn, OrderStatus::Open);
        seed_product(&storage, &txn, 1, 15_000, 1);

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = AddItemAction {
            order_id,
            product_id: 1,
            quantity: 2,
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

        // Nothing staged: the command rolls back as a whole
        let changes = ctx.into_changes();
        assert!(changes.orders.is_empty());
        assert!(changes.products.is_empty());
    }

    #[test]
    fn test_add_item_zero_quantity_rejected() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed_order(&storage, &txn, OrderStatus::Open);
        seed_product(&storage, &txn, 1, 15_000, 10);

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = AddItemAction {
            order_id,
            product_id: 1,
            quantity: 0,
        };

        let result = action.execute(&mut ctx, &create_test_metadata());
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[test]
    fn test_add_item_after_finish_playing_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed_order(&storage, &txn, OrderStatus::WaitingPayment);
        seed_product(&storage, &txn, 1, 15_000, 10);

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = AddItemAction {
            order_id,
            product_id: 1,
            quantity: 1,
        };

        let result = action.execute(&mut ctx, &create_test_metadata());
        assert!(matches!(result, Err(OrderError::InvalidStateTransition(_))));
    }

    #[test]
    fn test_add_item_unknown_order_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = AddItemAction {
            order_id: "nonexistent".to_string(),
            product_id: 1,
            quantity: 1,
        };

        let result = action.execute(&mut ctx, &create_test_metadata());
        assert!(matches!(result, Err(OrderError::OrderNotFound(_))));
    }

    #[test]
    fn test_add_item_unknown_product_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order_id = seed_order(&storage, &txn, OrderStatus::Open);

        let mut ctx = CommandContext::new(&txn, &storage);
        let action = AddItemAction {
            order_id,
            product_id: 42,
            quantity: 1,
        };

        let result = action.execute(&mut ctx, &create_test_metadata());
        assert!(matches!(result, Err(OrderError::ProductNotFound(42))));
    }
}
