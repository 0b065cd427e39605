use async_trait::async_trait;

use crate::error::UserResult;
use crate::models::{NewUser, User};

/// Repository trait for User persistence.
///
/// Implementations assign the sequential integer id in `create`. Email
/// comparisons are case-insensitive throughout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user, assigning its id
    async fn create(&self, new_user: NewUser) -> UserResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>>;

    /// Get a user by email
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Check if an email is already taken
    async fn email_exists(&self, email: &str) -> UserResult<bool>;

    /// List users, newest first
    async fn list(&self, skip: u64, limit: u64) -> UserResult<Vec<User>>;

    /// Count all users (for pagination)
    async fn count(&self) -> UserResult<u64>;

    /// Update an existing user
    async fn update(&self, user: User) -> UserResult<User>;

    /// Delete a user by ID, returning whether it existed
    async fn delete(&self, id: i64) -> UserResult<bool>;
}
