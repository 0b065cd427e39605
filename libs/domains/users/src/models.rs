use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// User entity.
///
/// Ids are sequential integers assigned by the repository, not by the
/// caller. The password hash never leaves the process: it is skipped on
/// serialization and absent from [`UserResponse`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Repository-assigned identifier
    pub id: i64,
    /// User email (unique, compared case-insensitively)
    pub email: String,
    /// Display name
    pub name: Option<String>,
    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Materialize a stored user from the repository-assigned id and the
    /// validated, hashed input.
    pub fn from_new(id: i64, new_user: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id,
            email: new_user.email,
            name: new_user.name,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. The password, when present, must already be
    /// hashed by the service layer.
    pub fn apply_update(&mut self, update: UpdateUser, new_password_hash: Option<String>) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(name) = update.name {
            self.name = Some(name);
        }
        if let Some(hash) = new_password_hash {
            self.password_hash = hash;
        }
        self.updated_at = Utc::now();
    }
}

/// Input for the repository's `create`: everything a [`User`] needs except
/// the id the repository assigns.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
}

/// User response DTO (without the password hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for creating a new user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

/// DTO for partially updating an existing user
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
}

/// DTO for user login
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
    pub password: String,
}

/// Response after a successful login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
}

/// Pagination parameters for the user list endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u64,
    /// Users per page
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    10
}

impl Default for ListUsersQuery {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl ListUsersQuery {
    pub fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    /// Users to skip: `(page - 1) * limit`, saturating at page 1
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1) * self.limit
    }
}

/// Pagination metadata for list responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    /// Count of every user, not just this page
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub has_more: bool,
}

/// One page of users plus pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub meta: ListMeta,
}

impl UserListResponse {
    pub fn new(data: Vec<UserResponse>, total: u64, query: ListUsersQuery) -> Self {
        let has_more = query.page.saturating_mul(query.limit) < total;
        Self {
            data,
            meta: ListMeta {
                total,
                page: query.page,
                limit: query.limit,
                has_more,
            },
        }
    }
}
