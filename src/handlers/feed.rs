use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    config::{DEFAULT_FEED_LIMIT, MAX_FEED_LIMIT},
    error::AppError,
    feed::{FeedBatchResolver, PgFeedStore},
    models::post::FeedParams,
    utils::jwt::Viewer,
};

/// List the feed: posts and shares, newest activity first.
/// Supports cursor-based pagination on activity time.
pub async fn list_feed(
    State(pool): State<PgPool>,
    State(feed): State<Arc<FeedBatchResolver>>,
    Viewer(viewer_id): Viewer,
    Query(params): Query<FeedParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_FEED_LIMIT)
        .clamp(1, MAX_FEED_LIMIT);

    let posts = PgFeedStore::new(pool)
        .load_feed_page(viewer_id, params.cursor, limit)
        .await?;

    let items = feed.resolve_batch(posts, viewer_id).await;

    Ok(Json(items))
}
