use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, ListUsersQuery, NewUser, UpdateUser, UserResponse};
use crate::repository::UserRepository;

/// Service layer for User business logic.
///
/// Owns password hashing; plaintext passwords never reach the repository.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new user with password hashing
    #[instrument(skip(self, input), fields(user_email = %input.email))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        if self.repository.email_exists(&input.email).await? {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let password_hash = self.hash_password(&input.password)?;

        let created = self
            .repository
            .create(NewUser {
                email: input.email,
                name: input.name,
                password_hash,
            })
            .await?;

        Ok(created.into())
    }

    /// Get a user by ID
    #[instrument(skip(self), fields(user_id = id))]
    pub async fn get_user(&self, id: i64) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        Ok(user.into())
    }

    /// List users, newest first, with the total count for pagination
    #[instrument(skip(self, query), fields(page = query.page, limit = query.limit))]
    pub async fn list_users(&self, query: ListUsersQuery) -> UserResult<(Vec<UserResponse>, u64)> {
        let total = self.repository.count().await?;
        let users = self.repository.list(query.skip(), query.limit).await?;

        let responses = users.into_iter().map(|u| u.into()).collect();
        Ok((responses, total))
    }

    /// Apply a partial update, re-hashing the password when one is provided
    #[instrument(skip(self, input), fields(user_id = id))]
    pub async fn update_user(&self, id: i64, input: UpdateUser) -> UserResult<UserResponse> {
        let mut user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let new_password_hash = match input.password {
            Some(ref password) => Some(self.hash_password(password)?),
            None => None,
        };

        // Check for a taken email only when the email actually changes
        if let Some(ref new_email) = input.email {
            if !new_email.eq_ignore_ascii_case(&user.email)
                && self.repository.email_exists(new_email).await?
            {
                return Err(UserError::DuplicateEmail(new_email.clone()));
            }
        }

        user.apply_update(input, new_password_hash);

        let updated = self.repository.update(user).await?;
        Ok(updated.into())
    }

    /// Delete a user
    #[instrument(skip(self), fields(user_id = id))]
    pub async fn delete_user(&self, id: i64) -> UserResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(UserError::NotFound(id));
        }

        Ok(())
    }

    /// Verify user credentials (for login).
    ///
    /// An unknown email and a wrong password fail identically, so the
    /// response does not reveal which emails are registered.
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(&self, email: &str, password: &str) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user.into())
    }

    // Password helpers

    fn hash_password(&self, password: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> UserResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryUserRepository;
    use crate::repository::MockUserRepository;

    fn service() -> UserService<InMemoryUserRepository> {
        UserService::new(InMemoryUserRepository::new())
    }

    fn create_input(email: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            name: Some("Ada".to_string()),
            password: "secret123".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let service = service();

        let created = service.create_user(create_input("ada@example.com")).await.unwrap();
        let fetched = service.get_user(created.id).await.unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.email, "ada@example.com");
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let service = service();
        service.create_user(create_input("ada@example.com")).await.unwrap();

        let result = service.create_user(create_input("ADA@example.com")).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn verify_credentials_accepts_the_right_password_only() {
        let service = service();
        let created = service.create_user(create_input("ada@example.com")).await.unwrap();

        let verified = service
            .verify_credentials("ada@example.com", "secret123")
            .await
            .unwrap();
        assert_eq!(verified.id, created.id);

        let wrong = service.verify_credentials("ada@example.com", "wrong").await;
        assert!(matches!(wrong, Err(UserError::InvalidCredentials)));

        let unknown = service.verify_credentials("ghost@example.com", "secret123").await;
        assert!(matches!(unknown, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn update_rehashes_the_password() {
        let service = service();
        let created = service.create_user(create_input("ada@example.com")).await.unwrap();

        service
            .update_user(
                created.id,
                UpdateUser {
                    password: Some("newsecret".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(service
            .verify_credentials("ada@example.com", "newsecret")
            .await
            .is_ok());
        assert!(matches!(
            service.verify_credentials("ada@example.com", "secret123").await,
            Err(UserError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn update_keeps_the_same_email_without_a_conflict() {
        let service = service();
        let created = service.create_user(create_input("ada@example.com")).await.unwrap();

        let updated = service
            .update_user(
                created.id,
                UpdateUser {
                    email: Some("ada@example.com".to_string()),
                    name: Some("Ada L".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name.as_deref(), Some("Ada L"));
    }

    #[tokio::test]
    async fn delete_then_get_reports_not_found() {
        let service = service();
        let created = service.create_user(create_input("ada@example.com")).await.unwrap();

        service.delete_user(created.id).await.unwrap();

        assert!(matches!(
            service.get_user(created.id).await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_user(created.id).await,
            Err(UserError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_paginates_with_totals() {
        // Seed through the repository to skip 25 argon2 hashes.
        let repo = InMemoryUserRepository::new();
        for i in 0..25 {
            repo.create(NewUser {
                email: format!("u{}@example.com", i),
                name: None,
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        }
        let service = UserService::new(repo);

        let (page, total) = service.list_users(ListUsersQuery::new(3, 10)).await.unwrap();

        assert_eq!(page.len(), 5);
        assert_eq!(total, 25);
        // Newest first: page 3 of 25 holds users 5 down to 1.
        assert_eq!(page[0].id, 5);
    }

    #[tokio::test]
    async fn create_stops_at_a_failing_repository() {
        let mut repo = MockUserRepository::new();
        repo.expect_email_exists()
            .returning(|_| Err(UserError::Internal("store offline".to_string())));
        repo.expect_create().never();

        let service = UserService::new(repo);

        let result = service.create_user(create_input("ada@example.com")).await;
        assert!(matches!(result, Err(UserError::Internal(_))));
    }
}
