//! redb-based storage layer for the lifecycle engine
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `tables` | `table_id` | `BilliardTable` | Billiard tables |
//! | `products` | `product_id` | `Product` | Price + stock owned here |
//! | `orders` | `order_id` | `Order` | Current order state |
//! | `bills` | `bill_id` | `Bill` | Issued bills (never deleted) |
//! | `table_orders` | `table_id` | `order_id` | Occupancy index: active order per table |
//! | `order_bills` | `order_id` | `bill_id` | One-bill-per-order guard |
//! | `counters` | name | `u64` | Id allocation for tables/products |
//!
//! The occupancy index is the authoritative active-order linkage: a table
//! is occupied exactly when it has an entry here, which keeps the
//! table/order relation one-directional with a derived lookup instead of a
//! stored back-pointer.
//!
//! # Durability & isolation
//!
//! redb commits are atomic and serialized across writers. Every command
//! runs inside a single write transaction, so cross-entity writes (order +
//! table + product stock) land together or not at all, and two concurrent
//! commands on the same order or table cannot interleave.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use thiserror::Error;

use shared::models::{BilliardTable, Bill, PaymentStatus, Product};
use shared::order::{Order, OrderStatus};

use super::traits::CommandChanges;

/// Billiard tables: key = table_id, value = JSON-serialized BilliardTable
const TABLES_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("tables");

/// Products: key = product_id, value = JSON-serialized Product
const PRODUCTS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("products");

/// Orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Bills: key = bill_id, value = JSON-serialized Bill
const BILLS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("bills");

/// Occupancy index: key = table_id, value = active order_id
const TABLE_ORDERS_TABLE: TableDefinition<i64, &str> = TableDefinition::new("table_orders");

/// Bill-per-order index: key = order_id, value = bill_id
const ORDER_BILLS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("order_bills");

/// Id counters: key = counter name, value = last allocated id
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const TABLE_COUNT_KEY: &str = "table_count";
const PRODUCT_COUNT_KEY: &str = "product_count";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Engine storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl OrderStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (tests and ephemeral setups)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Create all tables so later read transactions can open them
    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(TABLES_TABLE)?;
            let _ = write_txn.open_table(PRODUCTS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(BILLS_TABLE)?;
            let _ = write_txn.open_table(TABLE_ORDERS_TABLE)?;
            let _ = write_txn.open_table(ORDER_BILLS_TABLE)?;
            let _ = write_txn.open_table(COUNTERS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction (serialized across all writers)
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Id Counters ==========

    /// Allocate the next table id
    ///
    /// Runs its own short transaction: redb does not allow nested write
    /// transactions, so ids are pre-allocated before a command begins.
    pub fn next_table_id(&self) -> StorageResult<i64> {
        self.next_counter(TABLE_COUNT_KEY)
    }

    /// Allocate the next product id
    pub fn next_product_id(&self) -> StorageResult<i64> {
        self.next_counter(PRODUCT_COUNT_KEY)
    }

    fn next_counter(&self, key: &str) -> StorageResult<i64> {
        let txn = self.db.begin_write()?;
        let next = {
            let mut table = txn.open_table(COUNTERS_TABLE)?;
            let current = table.get(key)?.map(|g| g.value()).unwrap_or(0);
            let next = current + 1;
            table.insert(key, next)?;
            next
        };
        txn.commit()?;
        Ok(next as i64)
    }

    // ========== Billiard Tables ==========

    /// Store a table (within transaction)
    pub fn store_table(&self, txn: &WriteTransaction, table: &BilliardTable) -> StorageResult<()> {
        let mut t = txn.open_table(TABLES_TABLE)?;
        let value = serde_json::to_vec(table)?;
        t.insert(table.id, value.as_slice())?;
        Ok(())
    }

    /// Get a table by id (read-only)
    pub fn get_table(&self, table_id: i64) -> StorageResult<Option<BilliardTable>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(TABLES_TABLE)?;
        match t.get(table_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a table by id (within transaction)
    pub fn get_table_txn(
        &self,
        txn: &WriteTransaction,
        table_id: i64,
    ) -> StorageResult<Option<BilliardTable>> {
        let t = txn.open_table(TABLES_TABLE)?;
        match t.get(table_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All tables, ordered by id
    pub fn get_all_tables(&self) -> StorageResult<Vec<BilliardTable>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(TABLES_TABLE)?;
        let mut tables = Vec::new();
        for result in t.iter()? {
            let (_key, value) = result?;
            tables.push(serde_json::from_slice(value.value())?);
        }
        Ok(tables)
    }

    // ========== Products ==========

    /// Store a product (within transaction)
    pub fn store_product(&self, txn: &WriteTransaction, product: &Product) -> StorageResult<()> {
        let mut t = txn.open_table(PRODUCTS_TABLE)?;
        let value = serde_json::to_vec(product)?;
        t.insert(product.id, value.as_slice())?;
        Ok(())
    }

    /// Get a product by id (read-only)
    pub fn get_product(&self, product_id: i64) -> StorageResult<Option<Product>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(PRODUCTS_TABLE)?;
        match t.get(product_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a product by id (within transaction)
    pub fn get_product_txn(
        &self,
        txn: &WriteTransaction,
        product_id: i64,
    ) -> StorageResult<Option<Product>> {
        let t = txn.open_table(PRODUCTS_TABLE)?;
        match t.get(product_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    // ========== Orders ==========

    /// Store an order (within transaction)
    pub fn store_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut t = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        t.insert(order.order_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get an order by id (read-only)
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(ORDERS_TABLE)?;
        match t.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order by id (within transaction)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<Order>> {
        let t = txn.open_table(ORDERS_TABLE)?;
        match t.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All orders currently in `Open` status
    pub fn get_open_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for result in t.iter()? {
            let (_key, value) = result?;
            let order: Order = serde_json::from_slice(value.value())?;
            if order.status == OrderStatus::Open {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    // ========== Occupancy Index ==========

    /// Link a table to its active order
    pub fn set_table_order(
        &self,
        txn: &WriteTransaction,
        table_id: i64,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut t = txn.open_table(TABLE_ORDERS_TABLE)?;
        t.insert(table_id, order_id)?;
        Ok(())
    }

    /// Clear a table's active-order link
    pub fn clear_table_order(&self, txn: &WriteTransaction, table_id: i64) -> StorageResult<()> {
        let mut t = txn.open_table(TABLE_ORDERS_TABLE)?;
        t.remove(table_id)?;
        Ok(())
    }

    /// Active order id for a table (within transaction)
    pub fn order_for_table_txn(
        &self,
        txn: &WriteTransaction,
        table_id: i64,
    ) -> StorageResult<Option<String>> {
        let t = txn.open_table(TABLE_ORDERS_TABLE)?;
        Ok(t.get(table_id)?.map(|g| g.value().to_string()))
    }

    /// Active order id for a table (read-only)
    pub fn order_for_table(&self, table_id: i64) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(TABLE_ORDERS_TABLE)?;
        Ok(t.get(table_id)?.map(|g| g.value().to_string()))
    }

    // ========== Bills ==========

    /// Store a bill (within transaction)
    pub fn store_bill(&self, txn: &WriteTransaction, bill: &Bill) -> StorageResult<()> {
        let mut t = txn.open_table(BILLS_TABLE)?;
        let value = serde_json::to_vec(bill)?;
        t.insert(bill.bill_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Record the one-bill-per-order link
    pub fn mark_order_billed(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
        bill_id: &str,
    ) -> StorageResult<()> {
        let mut t = txn.open_table(ORDER_BILLS_TABLE)?;
        t.insert(order_id, bill_id)?;
        Ok(())
    }

    /// Get a bill by id (read-only)
    pub fn get_bill(&self, bill_id: &str) -> StorageResult<Option<Bill>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(BILLS_TABLE)?;
        match t.get(bill_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a bill by id (within transaction)
    pub fn get_bill_txn(
        &self,
        txn: &WriteTransaction,
        bill_id: &str,
    ) -> StorageResult<Option<Bill>> {
        let t = txn.open_table(BILLS_TABLE)?;
        match t.get(bill_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Bill id for an order, if one was ever issued (read-only)
    pub fn bill_id_for_order(&self, order_id: &str) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(ORDER_BILLS_TABLE)?;
        Ok(t.get(order_id)?.map(|g| g.value().to_string()))
    }

    /// Bill id for an order (within transaction)
    pub fn bill_id_for_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<String>> {
        let t = txn.open_table(ORDER_BILLS_TABLE)?;
        Ok(t.get(order_id)?.map(|g| g.value().to_string()))
    }

    /// Bills filtered by settlement status
    pub fn get_bills_by_payment_status(&self, status: PaymentStatus) -> StorageResult<Vec<Bill>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(BILLS_TABLE)?;
        let mut bills = Vec::new();
        for result in t.iter()? {
            let (_key, value) = result?;
            let bill: Bill = serde_json::from_slice(value.value())?;
            if bill.payment_status == status {
                bills.push(bill);
            }
        }
        Ok(bills)
    }

    // ========== Command Changes ==========

    /// Persist everything a command staged, inside its transaction
    pub fn apply_changes(
        &self,
        txn: &WriteTransaction,
        changes: &CommandChanges,
    ) -> StorageResult<()> {
        for table in &changes.tables {
            self.store_table(txn, table)?;
        }
        for product in &changes.products {
            self.store_product(txn, product)?;
        }
        for order in &changes.orders {
            self.store_order(txn, order)?;
        }
        for bill in &changes.bills {
            self.store_bill(txn, bill)?;
            self.mark_order_billed(txn, &bill.order_id, &bill.bill_id)?;
        }
        for (table_id, link) in &changes.table_links {
            match link {
                Some(order_id) => self.set_table_order(txn, *table_id, order_id)?,
                None => self.clear_table_order(txn, *table_id)?,
            }
        }
        Ok(())
    }
}
