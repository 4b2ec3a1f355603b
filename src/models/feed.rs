// src/models/feed.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{
    feed::metadata::RawMetadata,
    models::{comment::CommentSummary, share::ShareEnvelope, user::AuthorView},
};

/// One user's attendance record on an event post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventAttendance {
    #[serde(skip)]
    pub post_id: i64,
    pub user_id: i64,
    pub status: String,
}

/// DTO for toggling attendance on an event post.
#[derive(Debug, Default, Deserialize)]
pub struct AttendanceRequest {
    /// Attendance status, e.g. 'going' or 'interested'. Defaults to 'going'.
    pub status: Option<String>,
}

/// A post with everything the persistence layer joined onto it, ready for
/// resolution. `share` is set when the row is a reshare.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPost {
    pub id: i64,
    pub author_id: i64,
    pub content: String,
    pub category_id: i64,
    pub metadata: RawMetadata,
    pub images: Vec<String>,
    /// Post-level avatar override.
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub likes_count: i64,
    pub is_liked: bool,
    pub comments_count: i64,
    pub comments: Vec<CommentSummary>,
    pub event_attendance: Vec<EventAttendance>,
    pub share: Option<ShareEnvelope>,
}

impl FeedPost {
    /// Stand-in for a shared post whose row no longer exists at all.
    pub fn missing(share: ShareEnvelope) -> Self {
        Self {
            id: share.post_id,
            author_id: 0,
            content: String::new(),
            category_id: 0,
            metadata: RawMetadata::default(),
            images: Vec::new(),
            avatar_url: None,
            created_at: share.shared_at,
            likes_count: 0,
            is_liked: false,
            comments_count: 0,
            comments: Vec::new(),
            event_attendance: Vec::new(),
            share: Some(share),
        }
    }
}

/// Client-facing feed entry. Field names are part of the wire contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub unique_key: String,
    pub id: i64,
    pub content: String,
    pub category_id: i64,
    pub author: AuthorView,
    pub metadata: serde_json::Value,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub likes_count: i64,
    pub is_liked: bool,
    pub comments_count: i64,
    pub comments: Vec<CommentSummary>,
    pub is_post_owner: bool,
    pub is_share_owner: bool,
    pub shared_by: Option<ShareEnvelope>,
    pub event_attendance: Vec<EventAttendance>,
    pub is_attending: bool,
}
