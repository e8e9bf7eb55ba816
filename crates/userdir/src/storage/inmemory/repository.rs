//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use userdir_core::storage::{email_lookup_value, RepositoryError, Result, UserRepository};
use userdir_core::user::{User, UserUpdate};

/// In-memory storage backend for testing and dependency-free runs.
///
/// Uses a HashMap wrapped in `Arc<RwLock<_>>` for thread-safe access. Data
/// is not persisted and will be lost when the repository is dropped.
/// Matches the DynamoDB adapter's contract: duplicate emails fail creation
/// with `AlreadyExists`, prefix queries run over the `<email>#<created-date>`
/// lookup value and return results in lookup-value order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.id.to_string(),
            });
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.email.clone(),
            });
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user_fields(&self, id: Uuid, update: &UserUpdate) -> Result<()> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                update.apply_to(user);
                Ok(())
            }
            None => Err(RepositoryError::NotFound {
                entity_type: "User",
                id: id.to_string(),
            }),
        }
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        let mut users = self.users.write().await;
        if users.remove(&id).is_none() {
            return Err(RepositoryError::NotFound {
                entity_type: "User",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn find_by_email_prefix(&self, prefix: Option<&str>, limit: i32) -> Result<Vec<User>> {
        let users = self.users.read().await;
        let mut matches: Vec<(String, User)> = users
            .values()
            .map(|u| {
                (
                    email_lookup_value(&u.email, u.created_at.date_naive()),
                    u.clone(),
                )
            })
            .filter(|(lookup, _)| prefix.is_none_or(|p| lookup.starts_with(p)))
            .collect();

        // The secondary index returns items in sort-key order.
        matches.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(matches
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(_, user)| user)
            .collect())
    }
}
