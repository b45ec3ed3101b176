use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{User, UserStore};
use crate::error::DatabaseError;

/// Process-local user store. Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email))
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: &User) -> Result<(), DatabaseError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) || email_taken(&users, &user.email, None) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "Email already registered".to_string(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let mut all: Vec<User> = self.users.read().await.values().cloned().collect();
        all.sort_by_key(|u| u.created_at);
        Ok(all)
    }

    async fn update(&self, user: &User) -> Result<(), DatabaseError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, Some(user.id)) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "Email already registered".to_string(),
            ));
        }
        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", user.id)))?;

        stored.email = user.email.clone();
        stored.name = user.name.clone();
        stored.password_hash = user.password_hash.clone();
        stored.role = user.role;
        stored.updated_at = user.updated_at;
        Ok(())
    }

    async fn set_refresh_token_hash(
        &self,
        id: Uuid,
        hash: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", id)))?;

        stored.refresh_token_hash = hash.map(str::to_string);
        stored.touch();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}
