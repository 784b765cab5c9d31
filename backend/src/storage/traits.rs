//! # Storage Traits
//!
//! This module defines the storage abstraction that lets different backends
//! (SQLite, in-memory, the role-checked wrapper) be used interchangeably by
//! the domain layer.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use super::error::StoreResult;

/// The entity tables held by the record store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Users,
    Students,
    Teachers,
    Payments,
    Expenses,
    Attendance,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Users,
        Table::Students,
        Table::Teachers,
        Table::Payments,
        Table::Expenses,
        Table::Attendance,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Students => "students",
            Table::Teachers => "teachers",
            Table::Payments => "payments",
            Table::Expenses => "expenses",
            Table::Attendance => "attendance",
        }
    }

    /// Secondary indexes, named after the indexed document field
    pub fn indexes(&self) -> &'static [&'static str] {
        match self {
            Table::Students => &["paymentStatus", "class"],
            Table::Attendance => &["date", "studentId", "teacherId"],
            Table::Payments => &["studentId", "date"],
            Table::Users => &["username"],
            Table::Teachers | Table::Expenses => &[],
        }
    }

    pub fn has_index(&self, index: &str) -> bool {
        self.indexes().contains(&index)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key-value object store addressed by table and primary key.
///
/// Records are JSON documents whose `id` field is the primary key. Every
/// operation is an independent request; there is no batching and concurrent
/// writes to the same id are last-write-wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every record of the table, in insertion order
    async fn get_all(&self, table: Table) -> StoreResult<Vec<Value>>;

    async fn get_by_id(&self, table: Table, id: &str) -> StoreResult<Option<Value>>;

    /// Insert a record, failing with `DuplicateKey` if the id already exists
    async fn add(&self, table: Table, id: &str, record: Value) -> StoreResult<()>;

    /// Replace the record with this id, or insert it
    async fn update(&self, table: Table, id: &str, record: Value) -> StoreResult<()>;

    /// Delete by id. Deleting a missing record is not an error.
    async fn delete(&self, table: Table, id: &str) -> StoreResult<()>;

    /// Records whose indexed field equals `value`, in insertion order
    async fn find_by_index(&self, table: Table, index: &str, value: &str) -> StoreResult<Vec<Value>>;

    async fn get_setting(&self, key: &str) -> StoreResult<Option<String>>;

    async fn put_setting(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// Field of a document used by an index, as a comparable string
pub(crate) fn index_value<'a>(record: &'a Value, index: &str) -> Option<&'a str> {
    record.get(index).and_then(Value::as_str)
}
