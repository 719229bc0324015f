//! OrdersManager - command processing facade
//!
//! This is the in-process API the transport layer wraps. Every mutating
//! operation is one short-lived unit of work:
//!
//! ```text
//! open_table / add_item / close_order / create_bill / ...
//!     ├─ 1. Begin write transaction (serialized across writers)
//!     ├─ 2. Action validates state and stages entity writes
//!     ├─ 3. Staged writes persisted (order + table + product together)
//!     ├─ 4. Commit — an early error drops the transaction: full rollback
//!     └─ 5. Broadcast notifications (best-effort, failures swallowed)
//! ```
//!
//! Because redb serializes write transactions, concurrent commands on the
//! same order or table cannot interleave: a stock check and its decrement
//! always commit as one unit, and two `open_table` calls cannot both see a
//! free table.

mod error;
pub use error::{ManagerError, ManagerResult};

use std::path::Path;

use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tracing::{info, warn};

use shared::models::{
    BilliardTable, Bill, PaymentMethod, PaymentStatus, Product, ProductCreate, TableCreate,
    TableOverview, TableStatus,
};
use shared::order::{Notification, Order};
use shared::util::now_millis;

use super::actions::{
    AddItemAction, CancelOrderAction, CloseOrderAction, ConfirmPaymentAction, CreateBillAction,
    FinishPlayingAction, ModifyItemAction, OpenTableAction, RemoveItemAction, SetTableStatusAction,
};
use super::error::OrderError;
use super::storage::{OrderStorage, StorageError};
use super::traits::{CommandContext, CommandHandler, CommandMetadata};

/// Notification broadcast channel capacity
const NOTIFY_CHANNEL_CAPACITY: usize = 1024;

/// Capacity assumed when a table is created without one
const DEFAULT_TABLE_CAPACITY: i32 = 4;

/// Lifecycle engine facade
#[derive(Clone)]
pub struct OrdersManager {
    storage: OrderStorage,
    notify_tx: broadcast::Sender<Notification>,
    hourly_rate: Decimal,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<OrderStorage>")
            .field("hourly_rate", &self.hourly_rate)
            .finish()
    }
}

impl OrdersManager {
    /// Create a manager with a database at the given path
    pub fn new(db_path: impl AsRef<Path>, hourly_rate: Decimal) -> ManagerResult<Self> {
        let storage = OrderStorage::open(db_path)?;
        info!(hourly_rate = %hourly_rate, "OrdersManager started");
        Ok(Self::with_storage(storage, hourly_rate))
    }

    /// Create a manager from configuration
    pub fn from_config(config: &crate::config::Config) -> ManagerResult<Self> {
        Self::new(&config.db_path, config.hourly_rate)
    }

    /// Create a manager over existing storage
    pub fn with_storage(storage: OrderStorage, hourly_rate: Decimal) -> Self {
        let (notify_tx, _) = broadcast::channel(NOTIFY_CHANNEL_CAPACITY);
        Self {
            storage,
            notify_tx,
            hourly_rate,
        }
    }

    /// Subscribe to lifecycle/occupancy notifications
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notify_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    /// Run one command: execute against a fresh write transaction, persist
    /// the staged writes, commit, then broadcast
    fn run<A: CommandHandler>(&self, action: A) -> ManagerResult<A::Output> {
        let metadata = CommandMetadata {
            timestamp: now_millis(),
        };
        let txn = self.storage.begin_write()?;
        let mut ctx = CommandContext::new(&txn, &self.storage);

        // An error here drops the transaction, rolling back everything
        let output = action.execute(&mut ctx, &metadata)?;

        let changes = ctx.into_changes();
        self.storage.apply_changes(&txn, &changes)?;
        txn.commit().map_err(StorageError::from)?;

        self.broadcast(changes.notifications);
        Ok(output)
    }

    /// Fire-and-forget delivery; a committed command never fails on a send
    fn broadcast(&self, notifications: Vec<Notification>) {
        for notification in notifications {
            if self.notify_tx.send(notification).is_err() {
                warn!("Notification dropped: no active subscribers");
                break;
            }
        }
    }

    // ========== Table Occupancy ==========

    /// Open a free table: creates the order and starts the clock
    pub fn open_table(&self, table_id: i64, employee_id: i64) -> ManagerResult<Order> {
        self.run(OpenTableAction {
            table_id,
            employee_id,
        })
    }

    /// Close whatever order is active on the table
    pub fn close_table(&self, table_id: i64) -> ManagerResult<Order> {
        let order_id = self.storage.order_for_table(table_id)?.ok_or_else(|| {
            OrderError::Conflict(format!("Table {table_id} has no active order"))
        })?;
        self.run(CloseOrderAction { order_id })
    }

    /// Administrative status override (e.g. to RESERVED)
    pub fn set_table_status(
        &self,
        table_id: i64,
        status: TableStatus,
    ) -> ManagerResult<BilliardTable> {
        self.run(SetTableStatusAction { table_id, status })
    }

    /// Register a new table
    pub fn create_table(&self, payload: TableCreate) -> ManagerResult<BilliardTable> {
        // Pre-allocate the id outside the command transaction; redb does
        // not allow nested write transactions
        let id = self.storage.next_table_id()?;
        let table = BilliardTable {
            id,
            number: payload.number,
            name: payload.name,
            capacity: payload.capacity.unwrap_or(DEFAULT_TABLE_CAPACITY),
            status: TableStatus::Free,
        };

        let txn = self.storage.begin_write()?;
        self.storage.store_table(&txn, &table)?;
        txn.commit().map_err(StorageError::from)?;

        info!(table_id = id, number = table.number, "Table created");
        Ok(table)
    }

    /// All tables
    pub fn list_tables(&self) -> ManagerResult<Vec<BilliardTable>> {
        Ok(self.storage.get_all_tables()?)
    }

    /// Tables currently free
    pub fn free_tables(&self) -> ManagerResult<Vec<BilliardTable>> {
        Ok(self
            .storage
            .get_all_tables()?
            .into_iter()
            .filter(|t| t.status == TableStatus::Free)
            .collect())
    }

    /// Floor view: every table with its active order, if any
    pub fn table_overview(&self) -> ManagerResult<Vec<TableOverview>> {
        let mut overview = Vec::new();
        for table in self.storage.get_all_tables()? {
            let (current_order_id, start_time) = match self.storage.order_for_table(table.id)? {
                Some(order_id) => {
                    let start = self
                        .storage
                        .get_order(&order_id)?
                        .map(|order| order.start_time);
                    (Some(order_id), start)
                }
                None => (None, None),
            };
            overview.push(TableOverview {
                id: table.id,
                number: table.number,
                name: table.name,
                capacity: table.capacity,
                status: table.status,
                current_order_id,
                start_time,
            });
        }
        Ok(overview)
    }

    // ========== Order Lifecycle ==========

    /// Add units of a product to an open order
    pub fn add_item(&self, order_id: &str, product_id: i64, quantity: i32) -> ManagerResult<Order> {
        self.run(AddItemAction {
            order_id: order_id.to_string(),
            product_id,
            quantity,
        })
    }

    /// Change a line's quantity (the stock delta is the signed difference)
    pub fn update_item_quantity(
        &self,
        order_id: &str,
        product_id: i64,
        new_quantity: i32,
    ) -> ManagerResult<Order> {
        self.run(ModifyItemAction {
            order_id: order_id.to_string(),
            product_id,
            new_quantity,
        })
    }

    /// Remove a line, returning its stock
    pub fn remove_item(&self, order_id: &str, product_id: i64) -> ManagerResult<Order> {
        self.run(RemoveItemAction {
            order_id: order_id.to_string(),
            product_id,
        })
    }

    /// Stop the clock: OPEN → WAITING_PAYMENT
    pub fn finish_playing(&self, order_id: &str) -> ManagerResult<Order> {
        self.run(FinishPlayingAction {
            order_id: order_id.to_string(),
        })
    }

    /// End the session and free the table; billing is a separate step
    pub fn close_order(&self, order_id: &str) -> ManagerResult<Order> {
        self.run(CloseOrderAction {
            order_id: order_id.to_string(),
        })
    }

    /// Abandon an active order, releasing stock and the table
    pub fn cancel_order(&self, order_id: &str) -> ManagerResult<()> {
        self.run(CancelOrderAction {
            order_id: order_id.to_string(),
        })
    }

    /// Get an order by id
    pub fn get_order(&self, order_id: &str) -> ManagerResult<Order> {
        Ok(self
            .storage
            .get_order(order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?)
    }

    /// The order currently tying up a table, if any
    pub fn active_order_for_table(&self, table_id: i64) -> ManagerResult<Option<Order>> {
        match self.storage.order_for_table(table_id)? {
            Some(order_id) => Ok(self.storage.get_order(&order_id)?),
            None => Ok(None),
        }
    }

    /// All orders still in OPEN status
    pub fn open_orders(&self) -> ManagerResult<Vec<Order>> {
        Ok(self.storage.get_open_orders()?)
    }

    // ========== Billing ==========

    /// Finalize an order into a pending bill (items + play fee)
    pub fn create_bill(&self, order_id: &str, payment_method: PaymentMethod) -> ManagerResult<Bill> {
        self.run(CreateBillAction {
            order_id: order_id.to_string(),
            payment_method,
            hourly_rate: self.hourly_rate,
        })
    }

    /// Confirm settlement of a bill (idempotent)
    pub fn confirm_payment(&self, bill_id: &str, method: PaymentMethod) -> ManagerResult<Bill> {
        self.run(ConfirmPaymentAction {
            bill_id: bill_id.to_string(),
            method,
        })
    }

    /// Get a bill by id
    pub fn get_bill(&self, bill_id: &str) -> ManagerResult<Bill> {
        Ok(self
            .storage
            .get_bill(bill_id)?
            .ok_or_else(|| OrderError::BillNotFound(bill_id.to_string()))?)
    }

    /// The bill issued for an order, if any
    pub fn bill_for_order(&self, order_id: &str) -> ManagerResult<Option<Bill>> {
        match self.storage.bill_id_for_order(order_id)? {
            Some(bill_id) => Ok(self.storage.get_bill(&bill_id)?),
            None => Ok(None),
        }
    }

    /// Bills filtered by settlement status
    pub fn bills_by_payment_status(&self, status: PaymentStatus) -> ManagerResult<Vec<Bill>> {
        Ok(self.storage.get_bills_by_payment_status(status)?)
    }

    // ========== Catalog ==========

    /// Register a product the engine will price and stock-track
    pub fn register_product(&self, payload: ProductCreate) -> ManagerResult<Product> {
        if payload.price < Decimal::ZERO {
            return Err(
                OrderError::Validation(format!("price must be non-negative, got {}", payload.price))
                    .into(),
            );
        }
        if payload.stock_quantity < 0 {
            return Err(OrderError::Validation(format!(
                "stock_quantity must be non-negative, got {}",
                payload.stock_quantity
            ))
            .into());
        }

        let id = self.storage.next_product_id()?;
        let product = Product {
            id,
            name: payload.name,
            price: payload.price,
            stock_quantity: payload.stock_quantity,
        };

        let txn = self.storage.begin_write()?;
        self.storage.store_product(&txn, &product)?;
        txn.commit().map_err(StorageError::from)?;

        info!(product_id = id, name = %product.name, "Product registered");
        Ok(product)
    }

    /// Get a product by id
    pub fn get_product(&self, product_id: i64) -> ManagerResult<Product> {
        Ok(self
            .storage
            .get_product(product_id)?
            .ok_or(OrderError::ProductNotFound(product_id))?)
    }
}

#[cfg(test)]
mod tests;
