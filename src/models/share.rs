use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{feed::identity_key::ShareKey, models::user::DEFAULT_AVATAR};

/// Display name used when a share row carries no sharer name.
pub const DEFAULT_SHARER_NAME: &str = "User";

/// The reshare wrapped around a post in the feed (`sharedBy` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareEnvelope {
    /// Share id.
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub name: String,
    pub avatar_url: String,
    pub message: Option<String>,
    pub shared_at: DateTime<Utc>,
}

impl ShareEnvelope {
    pub fn key(&self) -> ShareKey {
        ShareKey::new(self.user_id, self.shared_at)
    }
}

/// Row loaded from 'shares' joined with the sharer. The sharer columns come
/// from an outer join and may be missing.
#[derive(Debug, Clone, FromRow)]
pub struct ShareRow {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ShareRow> for ShareEnvelope {
    fn from(row: ShareRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            user_id: row.user_id,
            name: row.name.unwrap_or_else(|| DEFAULT_SHARER_NAME.to_string()),
            avatar_url: row.avatar_url.unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            message: row.message,
            shared_at: row.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// DTO for sharing a post.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateShareRequest {
    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sharer_fields_fall_back() {
        let before = Utc::now();
        let envelope = ShareEnvelope::from(ShareRow {
            id: 4,
            post_id: 10,
            user_id: 2,
            name: None,
            avatar_url: None,
            message: None,
            created_at: None,
        });

        assert_eq!(envelope.name, "User");
        assert_eq!(envelope.avatar_url, DEFAULT_AVATAR);
        assert!(envelope.shared_at >= before);
    }
}
