use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ForumPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub like_count: i64,
    pub reply_count: i64,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ForumReply {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateForumPostRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 10000, message = "Content must be between 1 and 10000 characters"))]
    pub content: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateForumPostRequest {
    #[serde(default)]
    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters"))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 10000))]
    pub content: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateForumReplyRequest {
    #[validate(length(min = 1, max = 5000, message = "Reply must be between 1 and 5000 characters"))]
    pub content: String,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct ForumListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// A new reply plus what the caller needs to notify the post author.
#[derive(Debug, Clone)]
pub struct PostedReply {
    pub reply: ForumReply,
    pub post_author_id: Uuid,
    pub post_title: String,
}
