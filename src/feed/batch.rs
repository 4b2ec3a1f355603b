//! Resolves a page of posts into feed items, one item at a time and all
//! items concurrently.

use std::{sync::Arc, time::Duration};

use futures::future::join_all;

use crate::{
    error::AppError,
    feed::{
        assembler::{assemble, assemble_placeholder},
        store::{AccountStatus, AuthorDirectory, PostLookup},
        visibility::{
            DegradedReason, Resolution, UnavailablePlaceholder, UnavailableReason,
            VisibilityResolver,
        },
    },
    models::{
        feed::{FeedItem, FeedPost},
        share::ShareEnvelope,
    },
};

pub struct FeedBatchResolver {
    visibility: VisibilityResolver,
    authors: Arc<dyn AuthorDirectory>,
    item_timeout: Duration,
}

impl FeedBatchResolver {
    pub fn new(
        posts: Arc<dyn PostLookup>,
        accounts: Arc<dyn AccountStatus>,
        authors: Arc<dyn AuthorDirectory>,
        item_timeout: Duration,
    ) -> Self {
        Self {
            visibility: VisibilityResolver::new(posts, accounts),
            authors,
            item_timeout,
        }
    }

    /// Resolves one post end to end, bounded by the per-item timeout.
    pub async fn resolve_item(
        &self,
        post: FeedPost,
        viewer_id: Option<i64>,
    ) -> Result<FeedItem, DegradedReason> {
        tokio::time::timeout(self.item_timeout, self.resolve_unbounded(post, viewer_id))
            .await
            .map_err(|_| DegradedReason::TimedOut(self.item_timeout))?
    }

    async fn resolve_unbounded(
        &self,
        post: FeedPost,
        viewer_id: Option<i64>,
    ) -> Result<FeedItem, DegradedReason> {
        let resolution = self.visibility.resolve(post).await?;

        let author = match &resolution {
            Resolution::Visible(post) => self
                .authors
                .find_author_profile(post.author_id)
                .await
                .map_err(|e| DegradedReason::LookupFailed(e.to_string()))?,
            Resolution::Unavailable(_) => None,
        };

        assemble(resolution, author.as_ref(), viewer_id)
    }

    /// Output has the same length and order as `posts`. An item that fails to
    /// resolve is replaced by a placeholder.
    pub async fn resolve_batch(&self, posts: Vec<FeedPost>, viewer_id: Option<i64>) -> Vec<FeedItem> {
        let pending = posts.into_iter().map(|post| async move {
            let post_id = post.id;
            let fallback = post.share.clone();
            match self.resolve_item(post, viewer_id).await {
                Ok(item) => item,
                Err(reason) => {
                    tracing::warn!("Degrading feed item for post {}: {}", post_id, reason);
                    degraded_item(post_id, fallback, viewer_id)
                }
            }
        });

        join_all(pending).await
    }

    /// Single-post detail path. A missing author is an error here rather than
    /// a placeholder.
    pub async fn resolve_single(
        &self,
        post: FeedPost,
        viewer_id: Option<i64>,
    ) -> Result<FeedItem, AppError> {
        let post_id = post.id;
        let fallback = post.share.clone();
        match self.resolve_item(post, viewer_id).await {
            Ok(item) => Ok(item),
            Err(DegradedReason::AuthorMissing(_)) => {
                Err(AppError::NotFound("Author not found".to_string()))
            }
            Err(reason) => {
                tracing::warn!("Degrading post {}: {}", post_id, reason);
                Ok(degraded_item(post_id, fallback, viewer_id))
            }
        }
    }
}

/// Best-effort placeholder built from whatever share data the input carried.
fn degraded_item(
    post_id: i64,
    share: Option<ShareEnvelope>,
    viewer_id: Option<i64>,
) -> FeedItem {
    let post_id = share.as_ref().map_or(post_id, |s| s.post_id);
    assemble_placeholder(
        UnavailablePlaceholder {
            post_id,
            reason: UnavailableReason::OriginalPostDeleted,
            share,
            original_author: None,
        },
        viewer_id,
    )
}
