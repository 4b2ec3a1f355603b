//! Loads pages of feed posts with their likes, comments and attendance joined on.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, types::Json};

use crate::{
    config::RECENT_COMMENTS_PER_POST,
    error::AppError,
    feed::{metadata::RawMetadata, pg_store::PgFeedStore},
    models::{
        comment::CommentSummary,
        feed::{EventAttendance, FeedPost},
        share::{ShareEnvelope, ShareRow},
    },
};

/// One slot in the feed timeline: a post, or a share of one.
#[derive(Debug, FromRow)]
struct FeedEntryRow {
    post_id: i64,
    share_id: Option<i64>,
}

/// Post row with the viewer's like state. Soft-deleted rows are included so
/// shares of removed posts still have something to resolve.
#[derive(Debug, Clone, FromRow)]
struct FeedPostRow {
    id: i64,
    user_id: i64,
    content: String,
    category_id: i64,
    metadata: Json<serde_json::Value>,
    images: Json<Vec<String>>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    likes_count: i32,
    comments_count: i32,
    is_liked: bool,
}

impl FeedPostRow {
    fn into_feed_post(self, share: Option<ShareEnvelope>) -> FeedPost {
        FeedPost {
            id: self.id,
            author_id: self.user_id,
            content: self.content,
            category_id: self.category_id,
            metadata: RawMetadata::from(self.metadata.0),
            images: self.images.0,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
            likes_count: i64::from(self.likes_count),
            is_liked: self.is_liked,
            comments_count: i64::from(self.comments_count),
            comments: Vec::new(),
            event_attendance: Vec::new(),
            share,
        }
    }
}

impl PgFeedStore {
    /// Posts and shares by active accounts, newest activity first.
    pub async fn load_feed_page(
        &self,
        viewer_id: Option<i64>,
        cursor: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<FeedPost>, AppError> {
        let entries = sqlx::query_as::<_, FeedEntryRow>(
            r#"
            SELECT post_id, share_id
            FROM (
                SELECT p.id AS post_id, NULL::BIGINT AS share_id, p.created_at AS activity_at
                FROM posts p
                JOIN users u ON u.id = p.user_id
                WHERE p.deleted_at IS NULL AND u.deleted_at IS NULL
                UNION ALL
                SELECT s.post_id, s.id AS share_id, s.created_at AS activity_at
                FROM shares s
                JOIN users su ON su.id = s.user_id
                WHERE su.deleted_at IS NULL
            ) timeline
            WHERE ($1::TIMESTAMPTZ IS NULL OR activity_at < $1)
            ORDER BY activity_at DESC
            LIMIT $2
            "#,
        )
        .bind(cursor)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load feed timeline: {:?}", e);
            AppError::from(e)
        })?;

        let post_ids: Vec<i64> = entries.iter().map(|e| e.post_id).collect();
        let share_ids: Vec<i64> = entries.iter().filter_map(|e| e.share_id).collect();

        let posts = self.load_post_rows(&post_ids, viewer_id).await?;
        let mut shares = self.load_shares(&share_ids).await?;

        let mut page = Vec::with_capacity(entries.len());
        for entry in entries {
            let share = entry.share_id.and_then(|id| shares.remove(&id));
            // A post may appear several times on one page (itself plus shares).
            let row = posts.get(&entry.post_id);
            let post = match (row, share) {
                (Some(row), share) => row.clone().into_feed_post(share),
                (None, Some(share)) => FeedPost::missing(share),
                (None, None) => continue,
            };
            page.push(post);
        }

        self.attach_interactions(&mut page).await?;
        Ok(page)
    }

    /// A single live post for the detail view.
    pub async fn load_post(
        &self,
        post_id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Option<FeedPost>, AppError> {
        let row = sqlx::query_as::<_, FeedPostRow>(
            r#"
            SELECT
                p.id, p.user_id, p.content, p.category_id, p.metadata, p.images,
                p.avatar_url, p.created_at, p.likes_count, p.comments_count,
                (pl.user_id IS NOT NULL) AS is_liked
            FROM posts p
            LEFT JOIN post_likes pl ON pl.post_id = p.id AND pl.user_id = $2
            WHERE p.id = $1 AND p.deleted_at IS NULL
            "#,
        )
        .bind(post_id)
        .bind(viewer_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut page = vec![row.into_feed_post(None)];
        self.attach_interactions(&mut page).await?;
        Ok(page.pop())
    }

    async fn load_post_rows(
        &self,
        post_ids: &[i64],
        viewer_id: Option<i64>,
    ) -> Result<HashMap<i64, FeedPostRow>, AppError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, FeedPostRow>(
            r#"
            SELECT
                p.id, p.user_id, p.content, p.category_id, p.metadata, p.images,
                p.avatar_url, p.created_at, p.likes_count, p.comments_count,
                (pl.user_id IS NOT NULL) AS is_liked
            FROM posts p
            LEFT JOIN post_likes pl ON pl.post_id = p.id AND pl.user_id = $2
            WHERE p.id = ANY($1)
            "#,
        )
        .bind(post_ids)
        .bind(viewer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| (row.id, row)).collect())
    }

    async fn load_shares(&self, share_ids: &[i64]) -> Result<HashMap<i64, ShareEnvelope>, AppError> {
        if share_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ShareRow>(
            r#"
            SELECT s.id, s.post_id, s.user_id, u.name, u.avatar_url, s.message, s.created_at
            FROM shares s
            LEFT JOIN users u ON u.id = s.user_id
            WHERE s.id = ANY($1)
            "#,
        )
        .bind(share_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.id, ShareEnvelope::from(row)))
            .collect())
    }

    /// Joins recent comments and attendance records onto each post.
    async fn attach_interactions(&self, page: &mut [FeedPost]) -> Result<(), AppError> {
        let mut post_ids: Vec<i64> = page.iter().map(|p| p.id).collect();
        post_ids.sort_unstable();
        post_ids.dedup();
        if post_ids.is_empty() {
            return Ok(());
        }

        let comments = sqlx::query_as::<_, CommentSummary>(
            r#"
            SELECT id, post_id, user_id, username, content, created_at
            FROM (
                SELECT
                    c.id, c.post_id, c.user_id, u.name AS username, c.content, c.created_at,
                    ROW_NUMBER() OVER (PARTITION BY c.post_id ORDER BY c.created_at DESC) AS rn
                FROM comments c
                JOIN users u ON u.id = c.user_id
                WHERE c.post_id = ANY($1) AND c.deleted_at IS NULL
            ) ranked
            WHERE rn <= $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(&post_ids)
        .bind(RECENT_COMMENTS_PER_POST)
        .fetch_all(&self.pool)
        .await?;

        let attendance = sqlx::query_as::<_, EventAttendance>(
            r#"
            SELECT post_id, user_id, status
            FROM event_attendance
            WHERE post_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(&post_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut comments_by_post: HashMap<i64, Vec<CommentSummary>> = HashMap::new();
        for comment in comments {
            comments_by_post.entry(comment.post_id).or_default().push(comment);
        }
        let mut attendance_by_post: HashMap<i64, Vec<EventAttendance>> = HashMap::new();
        for record in attendance {
            attendance_by_post.entry(record.post_id).or_default().push(record);
        }

        for post in page.iter_mut() {
            if let Some(comments) = comments_by_post.get(&post.id) {
                post.comments = comments.clone();
            }
            if let Some(records) = attendance_by_post.get(&post.id) {
                post.event_attendance = records.clone();
            }
        }

        Ok(())
    }
}
