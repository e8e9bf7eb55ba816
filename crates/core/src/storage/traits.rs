use async_trait::async_trait;
use uuid::Uuid;

use crate::user::{User, UserUpdate};

use super::Result;

/// Repository for user record operations.
///
/// Every operation is a single call against the backing store; there are no
/// multi-item transactions. Email uniqueness is enforced by `create_user`:
/// a conflicting record makes it fail with `RepositoryError::AlreadyExists`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets a user by their ID.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Creates a new user. Fails with `AlreadyExists` when a record with a
    /// conflicting key or email is already stored.
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Applies a field-level update to an existing user. Fails with
    /// `NotFound` when no record exists for the ID.
    async fn update_user_fields(&self, id: Uuid, update: &UserUpdate) -> Result<()>;

    /// Deletes a user by their ID. Fails with `NotFound` when absent.
    async fn delete_user(&self, id: Uuid) -> Result<()>;

    /// Finds users whose email lookup value starts with `prefix`, bounded
    /// by `limit`. With no prefix, returns up to `limit` users.
    ///
    /// The lookup value is `<email>#<created-date>`, so passing a full email
    /// followed by `#` matches exactly that address.
    async fn find_by_email_prefix(&self, prefix: Option<&str>, limit: i32) -> Result<Vec<User>>;
}
