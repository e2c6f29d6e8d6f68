use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Media type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "media_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Audio,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Audio => "audio",
            MediaType::Video => "video",
        }
    }
}

/// Moderation status of a media item. Only `active` media is visible to regular users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "moderation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    Active,
    UnderReview,
    Removed,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Active => "active",
            ModerationStatus::UnderReview => "under_review",
            ModerationStatus::Removed => "removed",
        }
    }
}

/// Media record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Media {
    pub id: Uuid,
    pub uploader_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub media_type: MediaType,
    pub url: String,
    pub duration_seconds: Option<f64>,
    pub category: Option<String>,
    pub moderation_status: ModerationStatus,
    pub view_count: i64,
    pub like_count: i64,
    pub bookmark_count: i64,
    pub report_count: i32,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact media view embedded in bookmark listings and analytics.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MediaSummary {
    pub id: Uuid,
    pub title: String,
    pub media_type: MediaType,
    pub url: String,
    pub duration_seconds: Option<f64>,
    pub view_count: i64,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateMediaRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub media_type: MediaType,
    #[validate(url(message = "url must be a valid URL"))]
    pub url: String,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "duration_seconds must not be negative"))]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateMediaRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub category: Option<String>,
}

/// Query parameters for listing media
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct MediaListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub media_type: Option<MediaType>,
    /// Staff only; regular users always see `active` media
    pub status: Option<ModerationStatus>,
    pub sort: Option<String>,
    pub order: Option<String>,
}
