//! Lookups the resolution engine needs from persistence.

use async_trait::async_trait;
use sqlx::FromRow;

use crate::{
    error::AppError,
    models::user::{AuthorProfile, AuthorView},
};

/// Author of a post as recorded on the post row, including soft-deleted rows.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct OriginalAuthor {
    pub id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
    /// Whether the post itself was published anonymously.
    pub is_anonymous: bool,
}

impl OriginalAuthor {
    /// The identity that may be shown for this author on the post.
    pub fn public_view(&self) -> AuthorView {
        if self.is_anonymous {
            return AuthorView::anonymous();
        }
        AuthorView::from(&AuthorProfile {
            id: self.id,
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
        })
    }
}

/// Minimal proof that a post is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct PostRef {
    pub id: i64,
    pub user_id: i64,
}

#[async_trait]
pub trait PostLookup: Send + Sync {
    /// Must succeed for soft-deleted posts.
    async fn find_post_author(&self, post_id: i64) -> Result<Option<OriginalAuthor>, AppError>;

    /// Excludes soft-deleted posts.
    async fn find_post_by_id(&self, post_id: i64) -> Result<Option<PostRef>, AppError>;
}

#[async_trait]
pub trait AccountStatus: Send + Sync {
    async fn is_account_deleted(&self, user_id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait AuthorDirectory: Send + Sync {
    async fn find_author_profile(&self, user_id: i64) -> Result<Option<AuthorProfile>, AppError>;
}
