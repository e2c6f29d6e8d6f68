use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Bookmark {
    pub id: Uuid,
    pub user_id: Uuid,
    pub media_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Bookmark joined with the bookmarked media
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookmarkWithMedia {
    pub id: Uuid,
    pub media_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub media_type: super::MediaType,
    pub url: String,
    pub duration_seconds: Option<f64>,
}

/// Result of a like/bookmark toggle: whether the relation now exists and the updated counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ToggleResult {
    pub active: bool,
    pub count: i64,
}
