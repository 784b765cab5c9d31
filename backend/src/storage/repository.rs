//! Typed access to one entity table of a [`RecordStore`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared::{AttendanceRecord, Expense, Payment, Student, Teacher, User};
use std::marker::PhantomData;
use std::sync::Arc;

use super::error::{StoreError, StoreResult};
use super::traits::{RecordStore, Table};

/// A record type that lives in one entity table
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const TABLE: Table;

    fn id(&self) -> &str;
}

macro_rules! entity {
    ($ty:ty, $table:expr) => {
        impl Entity for $ty {
            const TABLE: Table = $table;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

entity!(Student, Table::Students);
entity!(Teacher, Table::Teachers);
entity!(Payment, Table::Payments);
entity!(Expense, Table::Expenses);
entity!(AttendanceRecord, Table::Attendance);
entity!(User, Table::Users);

/// Serializes entities in and out of their table
pub struct Repository<T> {
    store: Arc<dyn RecordStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    fn decode(value: Value) -> StoreResult<T> {
        serde_json::from_value(value).map_err(StoreError::from)
    }

    fn decode_all(values: Vec<Value>) -> StoreResult<Vec<T>> {
        values.into_iter().map(Self::decode).collect()
    }

    pub async fn all(&self) -> StoreResult<Vec<T>> {
        Self::decode_all(self.store.get_all(T::TABLE).await?)
    }

    pub async fn get(&self, id: &str) -> StoreResult<Option<T>> {
        self.store
            .get_by_id(T::TABLE, id)
            .await?
            .map(Self::decode)
            .transpose()
    }

    /// Like [`Repository::get`], but a missing record is an error
    pub async fn require(&self, id: &str) -> StoreResult<T> {
        self.get(id).await?.ok_or_else(|| StoreError::NotFound {
            table: T::TABLE,
            id: id.to_string(),
        })
    }

    /// Insert if absent, failing with `DuplicateKey` otherwise
    pub async fn add(&self, entity: &T) -> StoreResult<()> {
        let value = serde_json::to_value(entity)?;
        self.store.add(T::TABLE, entity.id(), value).await
    }

    pub async fn upsert(&self, entity: &T) -> StoreResult<()> {
        let value = serde_json::to_value(entity)?;
        self.store.update(T::TABLE, entity.id(), value).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(T::TABLE, id).await
    }

    pub async fn find(&self, index: &str, value: &str) -> StoreResult<Vec<T>> {
        Self::decode_all(self.store.find_by_index(T::TABLE, index, value).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRecordStore;
    use shared::{PaymentType, Role};

    fn payment(id: &str, student_id: &str, amount: f64) -> Payment {
        Payment {
            id: id.to_string(),
            student_id: student_id.to_string(),
            amount,
            date: "2024-12-01".to_string(),
            payment_type: PaymentType::Monthly,
            teacher_share: 0.0,
            school_share: 0.0,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_typed_roundtrip() {
        let repo: Repository<Payment> = Repository::new(Arc::new(MemoryRecordStore::new()));
        let first = payment("p1", "s1", 100.0);

        repo.add(&first).await.unwrap();
        assert_eq!(repo.get("p1").await.unwrap(), Some(first.clone()));
        assert!(matches!(repo.add(&first).await, Err(StoreError::DuplicateKey { .. })));

        repo.upsert(&payment("p2", "s2", 250.0)).await.unwrap();
        assert_eq!(repo.find("studentId", "s2").await.unwrap().len(), 1);
        assert_eq!(repo.all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_require_missing_record() {
        let repo: Repository<User> = Repository::new(Arc::new(MemoryRecordStore::new()));
        let result = repo.require("ghost").await;
        assert!(matches!(result, Err(StoreError::NotFound { table: Table::Users, .. })));

        let user = User {
            id: "1".to_string(),
            username: "secretary".to_string(),
            role: Role::Secretary,
            name: "Secretary User".to_string(),
        };
        repo.add(&user).await.unwrap();
        assert_eq!(repo.require("1").await.unwrap(), user);
    }
}
