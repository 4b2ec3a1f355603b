use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::share::CreateShareRequest,
    utils::{html::clean_html, jwt::Claims},
};

/// Share a live post into the caller's feed, with an optional message.
/// The same user may share the same post more than once.
pub async fn share_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
    payload: Option<Json<CreateShareRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    payload.validate()?;
    let user_id = claims.user_id()?;

    let exists: Option<i64> =
        sqlx::query_scalar("SELECT id FROM posts WHERE id = $1 AND deleted_at IS NULL")
            .bind(post_id)
            .fetch_optional(&pool)
            .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let share_id: i64 = sqlx::query_scalar(
        "INSERT INTO shares (post_id, user_id, message) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(post_id)
    .bind(user_id)
    .bind(payload.message.as_deref().map(clean_html))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to share post: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!(share_id, post_id, user_id, "Post shared");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": share_id })),
    ))
}

/// Remove a share. Sharer or admin only.
pub async fn delete_share(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(share_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let sharer: i64 = sqlx::query_scalar("SELECT user_id FROM shares WHERE id = $1")
        .bind(share_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Share not found".to_string()))?;

    if sharer != claims.user_id()? && !claims.is_admin() {
        return Err(AppError::Forbidden(
            "You are not authorized to delete this share".to_string(),
        ));
    }

    sqlx::query("DELETE FROM shares WHERE id = $1")
        .bind(share_id)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
