use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use url::Url;
use validator::Validate;

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub category_id: i64,

    /// Free-form key/value data; its shape depends on the category.
    pub metadata: Json<serde_json::Value>,

    /// Ordered list of image URLs.
    pub images: Json<Vec<String>>,

    /// Per-post override of the author's avatar.
    pub avatar_url: Option<String>,

    pub likes_count: i32,
    pub comments_count: i32,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content length must be between 1 and 10000 chars"
    ))]
    pub content: String,

    #[validate(range(min = 1))]
    pub category_id: i64,

    /// Either a JSON object or its serialized string form.
    #[validate(custom(function = validate_metadata))]
    pub metadata: Option<serde_json::Value>,

    #[serde(default)]
    #[validate(custom(function = validate_image_urls))]
    pub images: Vec<String>,

    #[validate(url)]
    pub avatar_url: Option<String>,
}

/// DTO for editing a post. Absent fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 10000))]
    pub content: Option<String>,

    #[validate(custom(function = validate_metadata))]
    pub metadata: Option<serde_json::Value>,

    #[validate(custom(function = validate_image_urls))]
    pub images: Option<Vec<String>>,
}

/// Query parameters for listing the feed.
#[derive(Debug, Deserialize)]
pub struct FeedParams {
    /// Cursor for pagination: the activity timestamp of the last item in the previous page.
    pub cursor: Option<chrono::DateTime<chrono::Utc>>,

    /// Number of items to return (default: 20, max: 100).
    pub limit: Option<i64>,
}

/// Limits the metadata payload size to prevent abuse.
fn validate_metadata(data: &serde_json::Value) -> Result<(), validator::ValidationError> {
    if !(data.is_object() || data.is_string()) {
        return Err(validator::ValidationError::new("metadata_must_be_object"));
    }
    if data.to_string().len() > 20000 {
        return Err(validator::ValidationError::new("payload_too_large"));
    }
    Ok(())
}

/// Validates a collection of image URLs, ensuring each meets length and format requirements.
fn validate_image_urls(urls: &[String]) -> Result<(), validator::ValidationError> {
    if urls.len() > 10 {
        return Err(validator::ValidationError::new("too_many_images"));
    }
    for url in urls {
        if url.len() > 500 {
            return Err(validator::ValidationError::new("url_too_long"));
        }
        if Url::parse(url).is_err() {
            return Err(validator::ValidationError::new("invalid_url"));
        }
    }
    Ok(())
}
