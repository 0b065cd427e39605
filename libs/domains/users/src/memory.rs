//! In-memory implementation of [`UserRepository`]
//!
//! The primary user store is an external collaborator of this service; this
//! repository stands in behind the same trait for the API process, tests and
//! local development. Ids are assigned from an atomic counter, so iteration
//! in id order is creation order.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User};
use crate::repository::UserRepository;

pub struct InMemoryUserRepository {
    users: RwLock<BTreeMap<i64, User>>,
    next_id: AtomicI64,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self {
            users: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> UserError {
    UserError::Internal("user store lock poisoned".to_string())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> UserResult<User> {
        let mut users = self.users.write().map_err(|_| poisoned())?;

        let email_taken = users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&new_user.email));
        if email_taken {
            return Err(UserError::DuplicateEmail(new_user.email));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let user = User::from_new(id, new_user);
        users.insert(id, user.clone());

        tracing::info!(user_id = user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        let user = users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned();
        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.values().any(|u| u.email.eq_ignore_ascii_case(email)))
    }

    async fn list(&self, skip: u64, limit: u64) -> UserResult<Vec<User>> {
        let users = self.users.read().map_err(|_| poisoned())?;

        // Reverse id order is newest first.
        let page = users
            .values()
            .rev()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok(page)
    }

    async fn count(&self) -> UserResult<u64> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.len() as u64)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().map_err(|_| poisoned())?;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }

        let email_taken = users
            .values()
            .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email));
        if email_taken {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = user.id, "Updated user");
        Ok(user)
    }

    async fn delete(&self, id: i64) -> UserResult<bool> {
        let mut users = self.users.write().map_err(|_| poisoned())?;

        if users.remove(&id).is_some() {
            tracing::info!(user_id = id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: None,
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();

        let first = repo.create(new_user("a@example.com")).await.unwrap();
        let second = repo.create(new_user("b@example.com")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("ada@example.com")).await.unwrap();

        let result = repo.create(new_user("ADA@example.com")).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn get_by_email_ignores_case() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("ada@example.com")).await.unwrap();

        let fetched = repo.get_by_email("ADA@EXAMPLE.COM").await.unwrap();
        assert!(fetched.is_some());
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let repo = InMemoryUserRepository::new();
        for i in 0..3 {
            repo.create(new_user(&format!("u{}@example.com", i)))
                .await
                .unwrap();
        }

        let page = repo.list(0, 10).await.unwrap();

        assert_eq!(page.len(), 3);
        assert_eq!(page[0].id, 3);
        assert_eq!(page[2].id, 1);
    }

    #[tokio::test]
    async fn list_applies_skip_and_limit() {
        let repo = InMemoryUserRepository::new();
        for i in 0..25 {
            repo.create(new_user(&format!("u{}@example.com", i)))
                .await
                .unwrap();
        }

        let third = repo.list(20, 10).await.unwrap();

        assert_eq!(third.len(), 5);
        assert_eq!(repo.count().await.unwrap(), 25);
    }

    #[tokio::test]
    async fn update_rejects_unknown_user_and_taken_email() {
        let repo = InMemoryUserRepository::new();
        let ada = repo.create(new_user("ada@example.com")).await.unwrap();
        repo.create(new_user("bob@example.com")).await.unwrap();

        let mut ghost = ada.clone();
        ghost.id = 99;
        assert!(matches!(
            repo.update(ghost).await,
            Err(UserError::NotFound(99))
        ));

        let mut stolen = ada.clone();
        stolen.email = "bob@example.com".to_string();
        assert!(matches!(
            repo.update(stolen).await,
            Err(UserError::DuplicateEmail(_))
        ));
    }

    #[tokio::test]
    async fn delete_reports_whether_the_user_existed() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("ada@example.com")).await.unwrap();

        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert!(repo.get_by_id(user.id).await.unwrap().is_none());
    }
}
