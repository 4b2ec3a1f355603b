use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::{FromRow, PgPool};

use crate::{error::AppError, models::user::MeResponse, utils::jwt::Claims};

#[derive(FromRow)]
struct MeRow {
    id: i64,
    username: String,
    name: String,
    avatar_url: Option<String>,
    role: String,
    created_at: chrono::DateTime<chrono::Utc>,
    posts_count: Option<i64>,
    shares_count: Option<i64>,
}

/// Get current user's profile and statistics.
pub async fn get_me(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let me = sqlx::query_as::<_, MeRow>(
        r#"
        SELECT
            u.id, u.username, u.name, u.avatar_url, u.role, u.created_at,
            (SELECT COUNT(*) FROM posts WHERE user_id = u.id AND deleted_at IS NULL) AS posts_count,
            (SELECT COUNT(*) FROM shares WHERE user_id = u.id) AS shares_count
        FROM users u
        WHERE u.id = $1 AND u.deleted_at IS NULL
        "#,
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(MeResponse {
        id: me.id,
        username: me.username,
        name: me.name,
        avatar_url: me.avatar_url,
        role: me.role,
        created_at: me.created_at,
        posts_count: me.posts_count.unwrap_or(0),
        shares_count: me.shares_count.unwrap_or(0),
    }))
}

/// Soft-delete the current account.
///
/// Posts stay in place; shares of them render as author-deleted placeholders.
pub async fn delete_me(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let result = sqlx::query(
        "UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(user_id)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to delete account: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id, "Account soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}
