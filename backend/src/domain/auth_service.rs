use shared::{Role, SessionResponse, User};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::{DomainError, DomainResult};
use crate::storage::{RecordStore, Repository, SessionHandle};

/// Built-in desk credentials. A login also needs a matching row in the users table.
const CREDENTIALS: &[(&str, &str)] = &[("secretary", "secretary123"), ("director", "director123")];

/// Login and session management.
///
/// Works on the raw store: looking up users and seeding them happens before
/// anyone is logged in.
#[derive(Clone)]
pub struct AuthService {
    users: Repository<User>,
    session: SessionHandle,
}

impl AuthService {
    pub fn new(raw_store: Arc<dyn RecordStore>, session: SessionHandle) -> Self {
        Self {
            users: Repository::new(raw_store),
            session,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> DomainResult<User> {
        let username = username.trim();
        info!("Login attempt for {}", username);

        let known = CREDENTIALS
            .iter()
            .any(|(name, secret)| *name == username && *secret == password);
        if !known {
            warn!("Rejected credentials for {}", username);
            return Err(DomainError::InvalidCredentials);
        }

        let user = self
            .users
            .find("username", username)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                warn!("No user record for {}", username);
                DomainError::InvalidCredentials
            })?;

        self.session.set_user(Some(user.clone()))?;
        info!("User {} logged in as {}", user.username, user.role);
        Ok(user)
    }

    pub fn logout(&self) -> DomainResult<()> {
        if let Some(user) = self.session.current_user() {
            info!("User {} logged out", user.username);
        }
        self.session.set_user(None)?;
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.current_user()
    }

    pub fn can_write(&self) -> bool {
        self.session.can_write()
    }

    pub fn session(&self) -> SessionResponse {
        SessionResponse {
            user: self.current_user(),
            can_write: self.can_write(),
        }
    }

    /// Create the secretary and director accounts when the users table is empty.
    /// Returns the number of users added.
    pub async fn seed_default_users(&self) -> DomainResult<usize> {
        if !self.users.all().await?.is_empty() {
            return Ok(0);
        }

        info!("Seeding default users");
        let defaults = [
            User {
                id: "1".to_string(),
                username: "secretary".to_string(),
                role: Role::Secretary,
                name: "Secretary User".to_string(),
            },
            User {
                id: "2".to_string(),
                username: "director".to_string(),
                role: Role::Director,
                name: "Director User".to_string(),
            },
        ];
        for user in &defaults {
            self.users.add(user).await?;
        }
        Ok(defaults.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRecordStore;

    async fn setup() -> AuthService {
        let service = AuthService::new(Arc::new(MemoryRecordStore::new()), SessionHandle::new());
        assert_eq!(service.seed_default_users().await.unwrap(), 2);
        service
    }

    #[tokio::test]
    async fn test_seeding_is_one_time() {
        let service = setup().await;
        assert_eq!(service.seed_default_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let service = setup().await;
        assert_eq!(service.session().user, None);

        let user = service.login("secretary", "secretary123").await.unwrap();
        assert_eq!(user.name, "Secretary User");
        assert!(service.can_write());

        service.logout().unwrap();
        assert!(service.current_user().is_none());
        assert!(!service.can_write());

        let director = service.login("director", "director123").await.unwrap();
        assert_eq!(director.role, Role::Director);
        assert!(!service.session().can_write);
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let service = setup().await;
        let result = service.login("secretary", "director123").await;
        assert!(matches!(result, Err(DomainError::InvalidCredentials)));
        assert!(service.current_user().is_none());
    }

    #[tokio::test]
    async fn test_login_needs_user_record() {
        let service = AuthService::new(Arc::new(MemoryRecordStore::new()), SessionHandle::new());
        let result = service.login("secretary", "secretary123").await;
        assert!(matches!(result, Err(DomainError::InvalidCredentials)));
    }
}
