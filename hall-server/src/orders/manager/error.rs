use thiserror::Error;

use crate::orders::error::OrderError;
use crate::orders::storage::StorageError;

/// Errors surfaced by the manager facade
///
/// Domain failures pass through transparently so callers can map the
/// taxonomy (validation, conflict, state transition, stock, not-found) to
/// user-facing responses; storage failures are the engine's own.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Order(#[from] OrderError),
}

impl ManagerError {
    /// The domain error, if this is one
    pub fn as_order_error(&self) -> Option<&OrderError> {
        match self {
            ManagerError::Order(err) => Some(err),
            ManagerError::Storage(_) => None,
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
