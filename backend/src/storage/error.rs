use shared::Role;
use thiserror::Error;

use super::traits::Table;

/// Errors raised by the record store and its wrappers
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database not initialized")]
    NotInitialized,

    #[error("Duplicate key '{id}' in table {table}")]
    DuplicateKey { table: Table, id: String },

    #[error("Record '{id}' not found in table {table}")]
    NotFound { table: Table, id: String },

    #[error("Unknown index '{index}' on table {table}")]
    UnknownIndex { table: Table, index: String },

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Role '{role}' is not allowed to modify records")]
    PermissionDenied { role: Role },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
