use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Role, User};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user; a taken email is `DuplicateEmail`
    async fn create(&self, user: User) -> UserResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Get a user by email, ignoring case
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// All users, oldest first
    async fn list(&self) -> UserResult<Vec<User>>;

    /// Set a user's role; `None` when the user does not exist
    async fn update_role(&self, id: Uuid, role: Role) -> UserResult<Option<User>>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        let email_exists = users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email));

        if email_exists {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        let user = users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned();
        Ok(user)
    }

    async fn list(&self) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users.values().cloned().collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(result)
    }

    async fn update_role(&self, id: Uuid, role: Role) -> UserResult<Option<User>> {
        let mut users = self.users.write().await;

        Ok(users.get_mut(&id).map(|user| {
            user.role = role;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}
