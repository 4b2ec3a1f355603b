use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, Transaction};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        comment::{CommentSummary, CreateCommentRequest},
        feed::AttendanceRequest,
    },
    utils::{html::clean_html, jwt::Claims},
};

/// Locks a live post row for the rest of the transaction.
async fn lock_live_post(tx: &mut Transaction<'_, Postgres>, post_id: i64) -> Result<(), AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM posts WHERE id = $1 AND deleted_at IS NULL FOR UPDATE")
        .bind(post_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;
    Ok(())
}

/// Toggle Like on a post.
pub async fn toggle_like(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let mut tx = pool.begin().await?;
    lock_live_post(&mut tx, post_id).await?;

    let removed = sqlx::query("DELETE FROM post_likes WHERE user_id = $1 AND post_id = $2")
        .bind(user_id)
        .bind(post_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
        > 0;

    if removed {
        sqlx::query("UPDATE posts SET likes_count = GREATEST(0, likes_count - 1) WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;
    } else {
        sqlx::query("INSERT INTO post_likes (user_id, post_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if e.to_string().contains("unique constraint") {
                    return AppError::Conflict("Already liked".to_string());
                }
                AppError::InternalServerError(e.to_string())
            })?;

        sqlx::query("UPDATE posts SET likes_count = likes_count + 1 WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(Json(serde_json::json!({ "liked": !removed })))
}

/// Create a new comment.
pub async fn create_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    let mut tx = pool.begin().await?;
    lock_live_post(&mut tx, post_id).await?;

    let new_id: i64 = sqlx::query_scalar(
        "INSERT INTO comments (post_id, user_id, content) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(post_id)
    .bind(user_id)
    .bind(clean_html(&payload.content))
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE posts SET comments_count = comments_count + 1 WHERE id = $1")
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": new_id })),
    ))
}

/// List all comments for a post, oldest first.
pub async fn list_comments(
    State(pool): State<PgPool>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let comments = sqlx::query_as::<_, CommentSummary>(
        r#"
        SELECT c.id, c.post_id, c.user_id, u.name AS username, c.content, c.created_at
        FROM comments c
        JOIN users u ON c.user_id = u.id
        WHERE c.post_id = $1 AND c.deleted_at IS NULL
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(comments))
}

/// Toggle the caller's attendance on an event post.
pub async fn toggle_attendance(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
    payload: Option<Json<AttendanceRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let status = payload
        .and_then(|Json(p)| p.status)
        .unwrap_or_else(|| "going".to_string());
    if !matches!(status.as_str(), "going" | "interested") {
        return Err(AppError::BadRequest("Invalid attendance status".to_string()));
    }

    let mut tx = pool.begin().await?;
    lock_live_post(&mut tx, post_id).await?;

    let removed = sqlx::query("DELETE FROM event_attendance WHERE post_id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
        > 0;

    if !removed {
        sqlx::query("INSERT INTO event_attendance (post_id, user_id, status) VALUES ($1, $2, $3)")
            .bind(post_id)
            .bind(user_id)
            .bind(&status)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(Json(serde_json::json!({ "attending": !removed })))
}
