//! Billiards hall engine — table, order and billing lifecycle
//!
//! # Architecture
//!
//! This crate is the core a point-of-sale front end wraps a transport
//! around. It owns the rules with real invariants: table occupancy, the
//! order item / stock ledger, and the billing calculation.
//!
//! ```text
//! hall-server/src/
//! ├── config.rs      # env-driven configuration
//! ├── orders/        # lifecycle engine
//! │   ├── actions/   # one handler per command
//! │   ├── manager/   # OrdersManager facade + tests
//! │   ├── storage.rs # redb persistence
//! │   ├── money.rs   # decimal arithmetic, play fee
//! │   └── stock.rs   # inventory ledger
//! └── utils/         # logging
//! ```
//!
//! Excluded collaborators (transport, authentication, catalog CRUD,
//! reporting, notification delivery) consume the [`orders::OrdersManager`]
//! API and its broadcast channel.

pub mod config;
pub mod orders;
pub mod utils;

// Re-export public types
pub use config::Config;
pub use orders::{ManagerError, ManagerResult, OrderError, OrderStorage, OrdersManager};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
