//! # Storage Module
//!
//! Handles all data persistence for the school records backend.
//!
//! Records are JSON documents grouped in entity tables and addressed by id.
//! The domain layer talks to the [`RecordStore`] trait, usually through a
//! typed [`Repository`], so the backend can be swapped without touching the
//! services.
//!
//! ## Backends
//!
//! - **SqliteRecordStore**: the durable store, one SQLite file in the data directory
//! - **MemoryRecordStore**: in-process store for tests
//! - **GuardedStore**: wraps either of the above and checks the session role
//!   before every operation

pub mod error;
pub mod guarded;
pub mod memory;
pub mod repository;
pub mod sqlite;
pub mod traits;

// Re-export the main types that other modules need
pub use error::{StoreError, StoreResult};
pub use guarded::{GuardedStore, SessionHandle, PREFERENCE_PREFIX};
pub use memory::MemoryRecordStore;
pub use repository::{Entity, Repository};
pub use sqlite::{SqliteRecordStore, DATABASE_FILE};
pub use traits::{RecordStore, Table};
