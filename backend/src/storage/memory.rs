use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

use super::error::{StoreError, StoreResult};
use super::traits::{index_value, RecordStore, Table};

/// In-process record store with the same semantics as the SQLite store.
///
/// Used by tests and tooling that do not need durability.
#[derive(Default)]
pub struct MemoryRecordStore {
    tables: RwLock<HashMap<Table, Vec<(String, Value)>>>,
    settings: RwLock<HashMap<String, String>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get_all(&self, table: Table) -> StoreResult<Vec<Value>> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables
            .get(&table)
            .map(|rows| rows.iter().map(|(_, v)| v.clone()).collect())
            .unwrap_or_default())
    }

    async fn get_by_id(&self, table: Table, id: &str) -> StoreResult<Option<Value>> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables
            .get(&table)
            .and_then(|rows| rows.iter().find(|(key, _)| key == id))
            .map(|(_, v)| v.clone()))
    }

    async fn add(&self, table: Table, id: &str, record: Value) -> StoreResult<()> {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        let rows = tables.entry(table).or_default();
        if rows.iter().any(|(key, _)| key == id) {
            return Err(StoreError::DuplicateKey {
                table,
                id: id.to_string(),
            });
        }
        rows.push((id.to_string(), record));
        Ok(())
    }

    async fn update(&self, table: Table, id: &str, record: Value) -> StoreResult<()> {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        let rows = tables.entry(table).or_default();
        match rows.iter_mut().find(|(key, _)| key == id) {
            Some((_, existing)) => *existing = record,
            None => rows.push((id.to_string(), record)),
        }
        Ok(())
    }

    async fn delete(&self, table: Table, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        if let Some(rows) = tables.get_mut(&table) {
            rows.retain(|(key, _)| key != id);
        }
        Ok(())
    }

    async fn find_by_index(&self, table: Table, index: &str, value: &str) -> StoreResult<Vec<Value>> {
        if !table.has_index(index) {
            return Err(StoreError::UnknownIndex {
                table,
                index: index.to_string(),
            });
        }
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|(_, v)| index_value(v, index) == Some(value))
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_setting(&self, key: &str) -> StoreResult<Option<String>> {
        let settings = self.settings.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(settings.get(key).cloned())
    }

    async fn put_setting(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut settings = self.settings.write().map_err(|_| StoreError::LockPoisoned)?;
        settings.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_semantics() {
        let store = MemoryRecordStore::new();
        let first = json!({ "id": "p1", "studentId": "s1", "amount": 100.0 });
        let second = json!({ "id": "p2", "studentId": "s2", "amount": 250.0 });

        store.add(Table::Payments, "p1", first.clone()).await.unwrap();
        store.add(Table::Payments, "p2", second.clone()).await.unwrap();
        assert!(matches!(
            store.add(Table::Payments, "p1", first.clone()).await,
            Err(StoreError::DuplicateKey { .. })
        ));

        let updated = json!({ "id": "p1", "studentId": "s1", "amount": 120.0 });
        store.update(Table::Payments, "p1", updated.clone()).await.unwrap();
        assert_eq!(store.get_all(Table::Payments).await.unwrap(), vec![updated, second]);

        let found = store.find_by_index(Table::Payments, "studentId", "s2").await.unwrap();
        assert_eq!(found.len(), 1);

        store.delete(Table::Payments, "p2").await.unwrap();
        store.delete(Table::Payments, "p2").await.unwrap();
        assert_eq!(store.get_by_id(Table::Payments, "p2").await.unwrap(), None);
    }
}
