//! Postgres implementation of the feed lookups.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppError,
    feed::{
        FeedBatchResolver,
        store::{AccountStatus, AuthorDirectory, OriginalAuthor, PostLookup, PostRef},
    },
    models::user::AuthorProfile,
};

#[derive(Clone)]
pub struct PgFeedStore {
    pub(crate) pool: PgPool,
}

impl PgFeedStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostLookup for PgFeedStore {
    async fn find_post_author(&self, post_id: i64) -> Result<Option<OriginalAuthor>, AppError> {
        // No deleted_at filters: authorship must survive removal of either row.
        // Only a JSON boolean `true` marks the post anonymous, as in `PostMetadata`.
        let author = sqlx::query_as::<_, OriginalAuthor>(
            r#"
            SELECT
                u.id, u.name, u.avatar_url,
                COALESCE(p.metadata->'isAnonymous' = 'true'::jsonb, FALSE) AS is_anonymous
            FROM posts p
            JOIN users u ON u.id = p.user_id
            WHERE p.id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(author)
    }

    async fn find_post_by_id(&self, post_id: i64) -> Result<Option<PostRef>, AppError> {
        let post = sqlx::query_as::<_, PostRef>(
            "SELECT id, user_id FROM posts WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }
}

#[async_trait]
impl AccountStatus for PgFeedStore {
    async fn is_account_deleted(&self, user_id: i64) -> Result<bool, AppError> {
        let deleted: Option<bool> =
            sqlx::query_scalar("SELECT deleted_at IS NOT NULL FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        // A user row that no longer exists counts as deleted.
        Ok(deleted.unwrap_or(true))
    }
}

#[async_trait]
impl AuthorDirectory for PgFeedStore {
    async fn find_author_profile(&self, user_id: i64) -> Result<Option<AuthorProfile>, AppError> {
        let profile = sqlx::query_as::<_, AuthorProfile>(
            "SELECT id, name, avatar_url FROM users WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }
}

impl FeedBatchResolver {
    /// Resolver whose collaborators all read from `pool`.
    pub fn for_pool(pool: PgPool, item_timeout: Duration) -> Self {
        let store = Arc::new(PgFeedStore::new(pool));
        FeedBatchResolver::new(store.clone(), store.clone(), store, item_timeout)
    }
}
