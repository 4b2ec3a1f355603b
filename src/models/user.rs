// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Name shown in place of the author of an anonymous post.
pub const ANONYMOUS_NAME: &str = "Usuário Anônimo";

/// Avatar used whenever no real avatar may (or can) be shown.
pub const DEFAULT_AVATAR: &str = "/default-avatar.png";

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique login name.
    pub username: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// Display name shown on posts and shares.
    pub name: String,

    pub avatar_url: Option<String>,

    /// User role: 'user' or 'admin'.
    pub role: String,

    pub created_at: chrono::DateTime<chrono::Utc>,

    /// Set when the account has been soft-deleted.
    #[serde(skip)]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Author record as stored, used for non-anonymous rendering.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AuthorProfile {
    pub id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Public author identity as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub id: i64,
    pub name: String,
    pub avatar_url: String,
}

impl AuthorView {
    /// The fixed identity substituted for the author of an anonymous post.
    pub fn anonymous() -> Self {
        Self::generic(ANONYMOUS_NAME)
    }

    /// An identity with no real account behind it.
    pub fn generic(name: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            avatar_url: DEFAULT_AVATAR.to_string(),
        }
    }
}

impl From<&AuthorProfile> for AuthorView {
    fn from(profile: &AuthorProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name.clone(),
            avatar_url: profile
                .avatar_url
                .clone()
                .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
        }
    }
}

/// Profile data for the current user.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub posts_count: i64,
    pub shares_count: i64,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    /// Display name; defaults to the username.
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}
