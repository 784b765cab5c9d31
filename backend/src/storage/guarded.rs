//! Role-checked access to the record store.
//!
//! The write permission lives here rather than in the UI: every caller that
//! goes through [`GuardedStore`] needs a logged-in user, and only a role that
//! can write may add, update or delete records.

use async_trait::async_trait;
use serde_json::Value;
use shared::User;
use std::sync::{Arc, RwLock};
use tracing::warn;

use super::error::{StoreError, StoreResult};
use super::traits::{RecordStore, Table};

/// Settings under this prefix are personal preferences any logged-in user may change
pub const PREFERENCE_PREFIX: &str = "pref.";

/// The currently logged-in user, shared between the auth service and the guarded store
#[derive(Clone, Default)]
pub struct SessionHandle {
    current: Arc<RwLock<Option<User>>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<User> {
        self.current.read().ok().and_then(|user| user.clone())
    }

    pub fn set_user(&self, user: Option<User>) -> StoreResult<()> {
        let mut current = self.current.write().map_err(|_| StoreError::LockPoisoned)?;
        *current = user;
        Ok(())
    }

    pub fn can_write(&self) -> bool {
        self.current_user()
            .map(|user| user.role.can_write())
            .unwrap_or(false)
    }
}

/// Capability-checked wrapper around a raw store
#[derive(Clone)]
pub struct GuardedStore {
    inner: Arc<dyn RecordStore>,
    session: SessionHandle,
}

impl GuardedStore {
    pub fn new(inner: Arc<dyn RecordStore>, session: SessionHandle) -> Self {
        Self { inner, session }
    }

    fn require_reader(&self) -> StoreResult<User> {
        self.session.current_user().ok_or(StoreError::NotAuthenticated)
    }

    fn require_writer(&self) -> StoreResult<User> {
        let user = self.require_reader()?;
        if !user.role.can_write() {
            warn!("Write rejected for user {} with role {}", user.username, user.role);
            return Err(StoreError::PermissionDenied { role: user.role });
        }
        Ok(user)
    }
}

#[async_trait]
impl RecordStore for GuardedStore {
    async fn get_all(&self, table: Table) -> StoreResult<Vec<Value>> {
        self.require_reader()?;
        self.inner.get_all(table).await
    }

    async fn get_by_id(&self, table: Table, id: &str) -> StoreResult<Option<Value>> {
        self.require_reader()?;
        self.inner.get_by_id(table, id).await
    }

    async fn add(&self, table: Table, id: &str, record: Value) -> StoreResult<()> {
        self.require_writer()?;
        self.inner.add(table, id, record).await
    }

    async fn update(&self, table: Table, id: &str, record: Value) -> StoreResult<()> {
        self.require_writer()?;
        self.inner.update(table, id, record).await
    }

    async fn delete(&self, table: Table, id: &str) -> StoreResult<()> {
        self.require_writer()?;
        self.inner.delete(table, id).await
    }

    async fn find_by_index(&self, table: Table, index: &str, value: &str) -> StoreResult<Vec<Value>> {
        self.require_reader()?;
        self.inner.find_by_index(table, index, value).await
    }

    async fn get_setting(&self, key: &str) -> StoreResult<Option<String>> {
        // Preferences are readable before login
        if !key.starts_with(PREFERENCE_PREFIX) {
            self.require_reader()?;
        }
        self.inner.get_setting(key).await
    }

    async fn put_setting(&self, key: &str, value: &str) -> StoreResult<()> {
        if key.starts_with(PREFERENCE_PREFIX) {
            self.require_reader()?;
        } else {
            self.require_writer()?;
        }
        self.inner.put_setting(key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRecordStore;
    use serde_json::json;
    use shared::Role;

    fn user(role: Role) -> User {
        User {
            id: "1".to_string(),
            username: role.to_string(),
            role,
            name: "Test User".to_string(),
        }
    }

    fn setup() -> (GuardedStore, SessionHandle) {
        let session = SessionHandle::new();
        let store = GuardedStore::new(Arc::new(MemoryRecordStore::new()), session.clone());
        (store, session)
    }

    #[tokio::test]
    async fn test_anonymous_access_is_rejected() {
        let (store, _session) = setup();
        assert!(matches!(store.get_all(Table::Students).await, Err(StoreError::NotAuthenticated)));
        assert!(matches!(
            store.add(Table::Expenses, "e1", json!({ "id": "e1" })).await,
            Err(StoreError::NotAuthenticated)
        ));
        assert!(matches!(store.put_setting("pref.locale", "ar").await, Err(StoreError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_anonymous_settings_reads() {
        let (store, session) = setup();
        let result = store.get_setting("schedule.grid").await;
        assert!(matches!(result, Err(StoreError::NotAuthenticated)));
        assert_eq!(store.get_setting("pref.locale").await.unwrap(), None);

        session.set_user(Some(user(Role::Director))).unwrap();
        assert_eq!(store.get_setting("schedule.grid").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_director_is_read_only() {
        let (store, session) = setup();
        session.set_user(Some(user(Role::Director))).unwrap();

        assert!(store.get_all(Table::Expenses).await.unwrap().is_empty());
        let result = store.update(Table::Expenses, "e1", json!({ "id": "e1" })).await;
        assert!(matches!(result, Err(StoreError::PermissionDenied { role: Role::Director })));
        let result = store.delete(Table::Expenses, "e1").await;
        assert!(matches!(result, Err(StoreError::PermissionDenied { .. })));
        let result = store.put_setting("schedule.grid", "{}").await;
        assert!(matches!(result, Err(StoreError::PermissionDenied { .. })));

        // Preferences are not records
        store.put_setting("pref.locale", "ar").await.unwrap();
    }

    #[tokio::test]
    async fn test_secretary_can_write() {
        let (store, session) = setup();
        session.set_user(Some(user(Role::Secretary))).unwrap();
        assert!(session.can_write());

        store.add(Table::Expenses, "e1", json!({ "id": "e1" })).await.unwrap();
        assert_eq!(store.get_all(Table::Expenses).await.unwrap().len(), 1);

        session.set_user(None).unwrap();
        assert!(!session.can_write());
    }
}
