//! Decides whether the post behind a reshare can still be shown.

use std::{fmt, sync::Arc, time::Duration};

use serde::Serialize;

use crate::{
    feed::{
        identity_key::generate_key,
        store::{AccountStatus, PostLookup},
    },
    models::{feed::FeedPost, share::ShareEnvelope, user::AuthorView},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnavailableReason {
    OriginalPostDeleted,
    OriginalAuthorDeleted,
}

impl UnavailableReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnavailableReason::OriginalPostDeleted => "ORIGINAL_POST_DELETED",
            UnavailableReason::OriginalAuthorDeleted => "ORIGINAL_AUTHOR_DELETED",
        }
    }
}

/// Stands in for a feed item whose content can no longer be shown.
#[derive(Debug, Clone, PartialEq)]
pub struct UnavailablePlaceholder {
    pub post_id: i64,
    pub reason: UnavailableReason,
    /// Always present for reshares; absent only when a bare post was degraded.
    pub share: Option<ShareEnvelope>,
    /// Only set for `OriginalPostDeleted`, already anonymized when required.
    pub original_author: Option<AuthorView>,
}

impl UnavailablePlaceholder {
    /// The share id when there is a share, otherwise the post id.
    pub fn id(&self) -> i64 {
        self.share.as_ref().map_or(self.post_id, |s| s.id)
    }

    pub fn unique_key(&self) -> String {
        generate_key(self.post_id, self.share.as_ref().map(|s| s.key()).as_ref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Visible(FeedPost),
    Unavailable(UnavailablePlaceholder),
}

/// Why an item could not be resolved normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradedReason {
    LookupFailed(String),
    AuthorMissing(i64),
    TimedOut(Duration),
}

impl fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradedReason::LookupFailed(msg) => write!(f, "lookup failed: {}", msg),
            DegradedReason::AuthorMissing(id) => write!(f, "author {} not found", id),
            DegradedReason::TimedOut(after) => write!(f, "timed out after {:?}", after),
        }
    }
}

pub struct VisibilityResolver {
    posts: Arc<dyn PostLookup>,
    accounts: Arc<dyn AccountStatus>,
}

impl VisibilityResolver {
    pub fn new(posts: Arc<dyn PostLookup>, accounts: Arc<dyn AccountStatus>) -> Self {
        Self { posts, accounts }
    }

    /// Bare posts pass through untouched. For reshares, a deleted original
    /// author takes precedence over a deleted original post.
    pub async fn resolve(&self, post: FeedPost) -> Result<Resolution, DegradedReason> {
        let Some(share) = post.share.clone() else {
            return Ok(Resolution::Visible(post));
        };
        let original_id = share.post_id;

        let author = self
            .posts
            .find_post_author(original_id)
            .await
            .map_err(|e| DegradedReason::LookupFailed(e.to_string()))?;

        let Some(author) = author else {
            return Ok(Resolution::Unavailable(UnavailablePlaceholder {
                post_id: original_id,
                reason: UnavailableReason::OriginalAuthorDeleted,
                share: Some(share),
                original_author: None,
            }));
        };

        let author_deleted = self
            .accounts
            .is_account_deleted(author.id)
            .await
            .map_err(|e| DegradedReason::LookupFailed(e.to_string()))?;

        if author_deleted {
            return Ok(Resolution::Unavailable(UnavailablePlaceholder {
                post_id: original_id,
                reason: UnavailableReason::OriginalAuthorDeleted,
                share: Some(share),
                original_author: None,
            }));
        }

        let original = self
            .posts
            .find_post_by_id(original_id)
            .await
            .map_err(|e| DegradedReason::LookupFailed(e.to_string()))?;

        match original {
            Some(_) => Ok(Resolution::Visible(post)),
            None => Ok(Resolution::Unavailable(UnavailablePlaceholder {
                post_id: original_id,
                reason: UnavailableReason::OriginalPostDeleted,
                share: Some(share),
                original_author: Some(author.public_view()),
            })),
        }
    }
}
