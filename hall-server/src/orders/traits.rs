//! Command execution traits and context
//!
//! Every lifecycle command is an action struct implementing
//! [`CommandHandler`]. Actions read and mutate entities through a
//! [`CommandContext`], which stages all writes against one open write
//! transaction; the manager persists the staged writes and commits, so a
//! failing action leaves no partial state behind.

use std::collections::HashMap;

use redb::WriteTransaction;

use shared::models::{BilliardTable, Bill, Product};
use shared::order::{Notification, Order};

use super::error::OrderError;
use super::storage::OrderStorage;

/// Per-command metadata (server clock at command arrival)
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub timestamp: i64,
}

/// One lifecycle command
pub trait CommandHandler {
    type Output;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Self::Output, OrderError>;
}

/// Staged state for one command execution
///
/// Loads read through the staged cache first, then the transaction, so an
/// action always observes its own earlier writes.
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a OrderStorage,
    tables: HashMap<i64, BilliardTable>,
    products: HashMap<i64, Product>,
    orders: HashMap<String, Order>,
    bills: HashMap<String, Bill>,
    /// Staged occupancy index writes: `Some(order_id)` links, `None` clears
    table_links: HashMap<i64, Option<String>>,
    notifications: Vec<Notification>,
}

impl<'a> CommandContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a OrderStorage) -> Self {
        Self {
            txn,
            storage,
            tables: HashMap::new(),
            products: HashMap::new(),
            orders: HashMap::new(),
            bills: HashMap::new(),
            table_links: HashMap::new(),
            notifications: Vec::new(),
        }
    }

    // ========== Loads ==========

    pub fn load_table(&mut self, table_id: i64) -> Result<BilliardTable, OrderError> {
        if let Some(table) = self.tables.get(&table_id) {
            return Ok(table.clone());
        }
        self.storage
            .get_table_txn(self.txn, table_id)?
            .ok_or(OrderError::TableNotFound(table_id))
    }

    pub fn load_product(&mut self, product_id: i64) -> Result<Product, OrderError> {
        if let Some(product) = self.products.get(&product_id) {
            return Ok(product.clone());
        }
        self.storage
            .get_product_txn(self.txn, product_id)?
            .ok_or(OrderError::ProductNotFound(product_id))
    }

    pub fn load_order(&mut self, order_id: &str) -> Result<Order, OrderError> {
        if let Some(order) = self.orders.get(order_id) {
            return Ok(order.clone());
        }
        self.storage
            .get_order_txn(self.txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    pub fn load_bill(&mut self, bill_id: &str) -> Result<Bill, OrderError> {
        if let Some(bill) = self.bills.get(bill_id) {
            return Ok(bill.clone());
        }
        self.storage
            .get_bill_txn(self.txn, bill_id)?
            .ok_or_else(|| OrderError::BillNotFound(bill_id.to_string()))
    }

    /// Active order id for a table, staged link first
    pub fn order_for_table(&mut self, table_id: i64) -> Result<Option<String>, OrderError> {
        if let Some(link) = self.table_links.get(&table_id) {
            return Ok(link.clone());
        }
        Ok(self.storage.order_for_table_txn(self.txn, table_id)?)
    }

    /// Bill id for an order, staged bills first
    pub fn bill_id_for_order(&mut self, order_id: &str) -> Result<Option<String>, OrderError> {
        if let Some(bill) = self.bills.values().find(|b| b.order_id == order_id) {
            return Ok(Some(bill.bill_id.clone()));
        }
        Ok(self.storage.bill_id_for_order_txn(self.txn, order_id)?)
    }

    // ========== Staged writes ==========

    pub fn save_table(&mut self, table: BilliardTable) {
        self.tables.insert(table.id, table);
    }

    pub fn save_product(&mut self, product: Product) {
        self.products.insert(product.id, product);
    }

    pub fn save_order(&mut self, order: Order) {
        self.orders.insert(order.order_id.clone(), order);
    }

    pub fn save_bill(&mut self, bill: Bill) {
        self.bills.insert(bill.bill_id.clone(), bill);
    }

    /// Link a table to its newly opened order
    pub fn occupy_table(&mut self, table_id: i64, order_id: &str) {
        self.table_links.insert(table_id, Some(order_id.to_string()));
    }

    /// Clear a table's active-order link
    pub fn release_table(&mut self, table_id: i64) {
        self.table_links.insert(table_id, None);
    }

    /// Queue a notification; broadcast only after the command commits
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Consume the context into the set of writes to persist
    pub fn into_changes(self) -> CommandChanges {
        CommandChanges {
            tables: self.tables.into_values().collect(),
            products: self.products.into_values().collect(),
            orders: self.orders.into_values().collect(),
            bills: self.bills.into_values().collect(),
            table_links: self.table_links.into_iter().collect(),
            notifications: self.notifications,
        }
    }
}

/// Writes staged by a command, applied by the manager before commit
pub struct CommandChanges {
    pub tables: Vec<BilliardTable>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub bills: Vec<Bill>,
    pub table_links: Vec<(i64, Option<String>)>,
    pub notifications: Vec<Notification>,
}
