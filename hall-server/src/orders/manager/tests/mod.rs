use rust_decimal::Decimal;

use shared::models::{PaymentMethod, PaymentStatus, ProductCreate, TableCreate, TableStatus};
use shared::order::{Notification, OrderStatus};

use super::*;
use crate::orders::error::OrderError;
use crate::orders::storage::OrderStorage;


const HOURLY_RATE: i64 = 60_000;

fn create_test_manager() -> OrdersManager {
    let storage = OrderStorage::open_in_memory().unwrap();
    OrdersManager::with_storage(storage, Decimal::from(HOURLY_RATE))
}

fn seed_table(manager: &OrdersManager, number: i32) -> i64 {
    manager
        .create_table(TableCreate {
            number,
            name: format!("Table {number}"),
            capacity: Some(4),
        })
        .unwrap()
        .id
}

fn seed_product(manager: &OrdersManager, name: &str, price: i64, stock: i64) -> i64 {
    manager
        .register_product(ProductCreate {
            name: name.to_string(),
            price: Decimal::from(price),
            stock_quantity: stock,
        })
        .unwrap()
        .id
}

/// Unwrap the domain error out of a manager failure
fn domain_err<T: std::fmt::Debug>(result: ManagerResult<T>) -> OrderError {
    match result {
        Err(ManagerError::Order(err)) => err,
        other => panic!("expected a domain error, got {other:?}"),
    }
}
