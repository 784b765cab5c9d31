use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde_json::Value;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::{StoreError, StoreResult};
use super::traits::{RecordStore, Table};

/// File name of the database inside the data directory
pub const DATABASE_FILE: &str = "tcc_school.db";

/// SQLite-backed record store.
///
/// Each entity table stores JSON documents keyed by `id`, with an
/// autoincrement `seq` column preserving insertion order and expression
/// indexes on the indexed document fields. The pool is opened once by
/// [`SqliteRecordStore::open`]; until then every operation fails with
/// `NotInitialized`.
pub struct SqliteRecordStore {
    path: PathBuf,
    pool: OnceCell<SqlitePool>,
}

impl SqliteRecordStore {
    /// Create an unopened store for the database file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool: OnceCell::new(),
        }
    }

    /// Create and open a store in `data_dir`
    pub async fn open_in(data_dir: &Path) -> StoreResult<Self> {
        let store = Self::new(data_dir.join(DATABASE_FILE));
        store.open().await?;
        Ok(store)
    }

    /// Open the database, creating it and its schema if needed.
    /// Calling this on an already opened store is a no-op.
    pub async fn open(&self) -> StoreResult<()> {
        if self.pool.get().is_some() {
            return Ok(());
        }

        // The path is taken as a file name, never parsed as a URL
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true);
        if !self.path.exists() {
            info!("Creating database at {}", self.path.display());
        }

        let pool = SqlitePool::connect_with(options).await?;
        Self::setup_schema(&pool).await?;

        // A concurrent open may have won the race; its pool is equivalent.
        let _ = self.pool.set(pool);
        info!("Database opened at {}", self.path.display());
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.pool.get().is_some()
    }

    fn pool(&self) -> StoreResult<&SqlitePool> {
        self.pool.get().ok_or(StoreError::NotInitialized)
    }

    /// Set up the entity tables, their indexes and the settings table
    async fn setup_schema(pool: &SqlitePool) -> StoreResult<()> {
        for table in Table::ALL {
            let create = format!(
                r#"
                CREATE TABLE IF NOT EXISTS {name} (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    id TEXT NOT NULL UNIQUE,
                    body TEXT NOT NULL
                );
                "#,
                name = table.name()
            );
            sqlx::query(&create).execute(pool).await?;

            for index in table.indexes() {
                let create_index = format!(
                    "CREATE INDEX IF NOT EXISTS idx_{name}_{index} ON {name}(json_extract(body, '$.{index}'));",
                    name = table.name(),
                    index = index
                );
                sqlx::query(&create_index).execute(pool).await?;
            }
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    fn decode_rows(rows: Vec<sqlx::sqlite::SqliteRow>) -> StoreResult<Vec<Value>> {
        rows.iter()
            .map(|row| {
                let body: String = row.get("body");
                serde_json::from_str(&body).map_err(StoreError::from)
            })
            .collect()
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn get_all(&self, table: Table) -> StoreResult<Vec<Value>> {
        let pool = self.pool()?;
        let sql = format!("SELECT body FROM {} ORDER BY seq ASC", table.name());
        let rows = sqlx::query(&sql).fetch_all(pool).await?;
        Self::decode_rows(rows)
    }

    async fn get_by_id(&self, table: Table, id: &str) -> StoreResult<Option<Value>> {
        let pool = self.pool()?;
        let sql = format!("SELECT body FROM {} WHERE id = ?", table.name());
        let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

        match row {
            Some(r) => {
                let body: String = r.get("body");
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }

    async fn add(&self, table: Table, id: &str, record: Value) -> StoreResult<()> {
        let pool = self.pool()?;
        let sql = format!("INSERT INTO {} (id, body) VALUES (?, ?)", table.name());
        let body = serde_json::to_string(&record)?;

        match sqlx::query(&sql).bind(id).bind(body).execute(pool).await {
            Ok(_) => {
                debug!("Inserted {} into {}", id, table);
                Ok(())
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::DuplicateKey {
                    table,
                    id: id.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, table: Table, id: &str, record: Value) -> StoreResult<()> {
        let pool = self.pool()?;
        let sql = format!(
            "INSERT INTO {} (id, body) VALUES (?, ?) ON CONFLICT(id) DO UPDATE SET body = excluded.body",
            table.name()
        );
        let body = serde_json::to_string(&record)?;
        sqlx::query(&sql).bind(id).bind(body).execute(pool).await?;
        debug!("Upserted {} in {}", id, table);
        Ok(())
    }

    async fn delete(&self, table: Table, id: &str) -> StoreResult<()> {
        let pool = self.pool()?;
        let sql = format!("DELETE FROM {} WHERE id = ?", table.name());
        let result = sqlx::query(&sql).bind(id).execute(pool).await?;
        debug!("Deleted {} from {} ({} rows)", id, table, result.rows_affected());
        Ok(())
    }

    async fn find_by_index(&self, table: Table, index: &str, value: &str) -> StoreResult<Vec<Value>> {
        let pool = self.pool()?;
        // Only known index names are ever formatted into the statement.
        if !table.has_index(index) {
            return Err(StoreError::UnknownIndex {
                table,
                index: index.to_string(),
            });
        }
        let sql = format!(
            "SELECT body FROM {} WHERE json_extract(body, '$.{}') = ? ORDER BY seq ASC",
            table.name(),
            index
        );
        let rows = sqlx::query(&sql).bind(value).fetch_all(pool).await?;
        Self::decode_rows(rows)
    }

    async fn get_setting(&self, key: &str) -> StoreResult<Option<String>> {
        let pool = self.pool()?;
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|r| r.get("value")))
    }

    async fn put_setting(&self, key: &str, value: &str) -> StoreResult<()> {
        let pool = self.pool()?;
        sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn setup_test() -> (SqliteRecordStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SqliteRecordStore::open_in(temp_dir.path())
            .await
            .expect("Failed to open test database");
        (store, temp_dir)
    }

    fn expense(id: &str, amount: f64) -> Value {
        json!({ "id": id, "type": "Rent", "date": "2024-12-01", "amount": amount })
    }

    #[tokio::test]
    async fn test_unopened_store_is_not_initialized() {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteRecordStore::new(temp_dir.path().join(DATABASE_FILE));

        assert!(!store.is_open());
        let result = store.get_all(Table::Students).await;
        assert!(matches!(result, Err(StoreError::NotInitialized)));
        let result = store.delete(Table::Students, "x").await;
        assert!(matches!(result, Err(StoreError::NotInitialized)));

        store.open().await.expect("Failed to open");
        assert!(store.get_all(Table::Students).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_data_dir_with_url_characters() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("Documents ?#% 50%");
        std::fs::create_dir_all(&data_dir).unwrap();

        let store = SqliteRecordStore::open_in(&data_dir).await.unwrap();
        store.add(Table::Expenses, "e1", expense("e1", 1200.0)).await.unwrap();
        drop(store);

        assert!(data_dir.join(DATABASE_FILE).exists());
        let reopened = SqliteRecordStore::open_in(&data_dir).await.unwrap();
        let records = reopened.get_all(Table::Expenses).await.unwrap();
        assert_eq!(records, vec![expense("e1", 1200.0)]);
    }

    #[tokio::test]
    async fn test_add_then_get_by_id() {
        let (store, _temp_dir) = setup_test().await;
        let record = expense("e1", 15000.0);

        store.add(Table::Expenses, "e1", record.clone()).await.unwrap();

        let fetched = store.get_by_id(Table::Expenses, "e1").await.unwrap();
        assert_eq!(fetched, Some(record));
        assert_eq!(store.get_by_id(Table::Expenses, "missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_add_duplicate_key_fails() {
        let (store, _temp_dir) = setup_test().await;
        store.add(Table::Expenses, "e1", expense("e1", 1.0)).await.unwrap();

        let result = store.add(Table::Expenses, "e1", expense("e1", 2.0)).await;
        assert!(matches!(result, Err(StoreError::DuplicateKey { table: Table::Expenses, .. })));

        // The first record is untouched
        let fetched = store.get_by_id(Table::Expenses, "e1").await.unwrap().unwrap();
        assert_eq!(fetched["amount"], 1.0);
    }

    #[tokio::test]
    async fn test_update_is_upsert_without_duplicates() {
        let (store, _temp_dir) = setup_test().await;
        store.update(Table::Expenses, "e1", expense("e1", 1.0)).await.unwrap();
        store.add(Table::Expenses, "e2", expense("e2", 5.0)).await.unwrap();
        store.update(Table::Expenses, "e1", expense("e1", 3.0)).await.unwrap();

        let all = store.get_all(Table::Expenses).await.unwrap();
        assert_eq!(all.len(), 2);
        // Insertion order is kept across updates
        assert_eq!(all[0]["id"], "e1");
        assert_eq!(all[0]["amount"], 3.0);
        assert_eq!(all[1]["id"], "e2");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (store, _temp_dir) = setup_test().await;
        store.add(Table::Expenses, "e1", expense("e1", 1.0)).await.unwrap();

        store.delete(Table::Expenses, "e1").await.unwrap();
        assert_eq!(store.get_by_id(Table::Expenses, "e1").await.unwrap(), None);
        store.delete(Table::Expenses, "e1").await.unwrap();
    }

    #[tokio::test]
    async fn test_find_by_index() {
        let (store, _temp_dir) = setup_test().await;
        let present = json!({ "id": "a1", "studentId": "s1", "date": "2024-12-01", "status": "present", "type": "student" });
        let other_day = json!({ "id": "a2", "studentId": "s1", "date": "2024-12-02", "status": "absent", "type": "student" });
        store.add(Table::Attendance, "a1", present.clone()).await.unwrap();
        store.add(Table::Attendance, "a2", other_day).await.unwrap();

        let found = store.find_by_index(Table::Attendance, "date", "2024-12-01").await.unwrap();
        assert_eq!(found, vec![present]);

        let by_student = store.find_by_index(Table::Attendance, "studentId", "s1").await.unwrap();
        assert_eq!(by_student.len(), 2);

        let result = store.find_by_index(Table::Expenses, "type", "Rent").await;
        assert!(matches!(result, Err(StoreError::UnknownIndex { .. })));
    }

    #[tokio::test]
    async fn test_settings_roundtrip() {
        let (store, _temp_dir) = setup_test().await;
        assert_eq!(store.get_setting("pref.locale").await.unwrap(), None);

        store.put_setting("pref.locale", "ar").await.unwrap();
        store.put_setting("pref.locale", "fr").await.unwrap();
        assert_eq!(store.get_setting("pref.locale").await.unwrap(), Some("fr".to_string()));
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = SqliteRecordStore::open_in(temp_dir.path()).await.unwrap();
            store.add(Table::Expenses, "e1", expense("e1", 1.0)).await.unwrap();
        }

        let store = SqliteRecordStore::open_in(temp_dir.path()).await.unwrap();
        assert!(store.get_by_id(Table::Expenses, "e1").await.unwrap().is_some());
    }
}
