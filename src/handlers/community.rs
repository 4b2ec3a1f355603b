use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, types::Json as SqlJson};
use validator::Validate;

use crate::{
    error::AppError,
    feed::{FeedBatchResolver, PgFeedStore},
    models::post::{CreatePostRequest, Post, UpdatePostRequest},
    utils::{
        html::clean_html,
        jwt::{Claims, Viewer},
    },
};

/// Stores metadata as an object even when the client sent it serialized.
fn normalize_metadata(metadata: Option<serde_json::Value>) -> Result<serde_json::Value, AppError> {
    match metadata {
        None => Ok(serde_json::json!({})),
        Some(serde_json::Value::String(raw)) => {
            let parsed: serde_json::Value = serde_json::from_str(&raw)?;
            if !parsed.is_object() {
                return Err(AppError::BadRequest("Metadata must be an object".to_string()));
            }
            Ok(parsed)
        }
        Some(value) => Ok(value),
    }
}

/// Create a new post.
pub async fn create_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user_id = claims.user_id()?;
    let metadata = normalize_metadata(payload.metadata)?;

    let post_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO posts (user_id, content, category_id, metadata, images, avatar_url)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(clean_html(&payload.content))
    .bind(payload.category_id)
    .bind(SqlJson(metadata))
    .bind(SqlJson(payload.images))
    .bind(payload.avatar_url)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create post: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!(post_id, user_id, "Post created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"id": post_id})),
    ))
}

/// Get a single post as a feed item.
pub async fn get_post(
    State(pool): State<PgPool>,
    State(feed): State<Arc<FeedBatchResolver>>,
    Viewer(viewer_id): Viewer,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = PgFeedStore::new(pool)
        .load_post(id, viewer_id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let item = feed.resolve_single(post, viewer_id).await?;

    Ok(Json(item))
}

/// Fetches a live post and checks the caller may modify it.
async fn owned_post(pool: &PgPool, id: i64, claims: &Claims, allow_admin: bool) -> Result<Post, AppError> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, content, category_id, metadata, images, avatar_url,
               likes_count, comments_count, created_at, updated_at, deleted_at
        FROM posts
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let is_author = post.user_id == claims.user_id()?;
    if !is_author && !(allow_admin && claims.is_admin()) {
        return Err(AppError::Forbidden(
            "You are not authorized to modify this post".to_string(),
        ));
    }

    Ok(post)
}

/// Edit content, metadata or images. Author only.
pub async fn update_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let post = owned_post(&pool, id, &claims, false).await?;

    let content = payload
        .content
        .as_deref()
        .map(clean_html)
        .unwrap_or(post.content);
    let metadata = match payload.metadata {
        Some(metadata) => normalize_metadata(Some(metadata))?,
        None => post.metadata.0,
    };
    let images = payload.images.unwrap_or(post.images.0);

    sqlx::query(
        r#"
        UPDATE posts
        SET content = $1, metadata = $2, images = $3, updated_at = NOW()
        WHERE id = $4
        "#,
    )
    .bind(content)
    .bind(SqlJson(metadata))
    .bind(SqlJson(images))
    .bind(id)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update post: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a post (Soft Delete).
/// Requires: Login + (Author OR Admin).
pub async fn delete_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    owned_post(&pool, id, &claims, true).await?;

    sqlx::query("UPDATE posts SET deleted_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete post: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    tracing::info!(post_id = id, "Post soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}
