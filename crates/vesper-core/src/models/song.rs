use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Copyright-free song
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Song {
    pub id: Uuid,
    pub title: String,
    pub artist: Option<String>,
    pub genre: Option<String>,
    pub license: String,
    pub audio_url: String,
    pub duration_seconds: Option<f64>,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateSongRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub artist: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub genre: Option<String>,
    #[validate(length(min = 1, max = 100, message = "license is required"))]
    pub license: String,
    #[validate(url(message = "audio_url must be a valid URL"))]
    pub audio_url: String,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateSongRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub artist: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub genre: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub license: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub audio_url: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct SongListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub genre: Option<String>,
    pub license: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SongDownload {
    pub id: Uuid,
    pub audio_url: String,
    pub download_count: i64,
}
