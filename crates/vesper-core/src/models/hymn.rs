use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Hymn {
    pub id: Uuid,
    pub number: Option<i32>,
    pub title: String,
    pub author: Option<String>,
    pub category: Option<String>,
    pub lyrics: String,
    pub tune: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateHymnRequest {
    #[serde(default)]
    #[validate(range(min = 1))]
    pub number: Option<i32>,
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub author: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(min = 1, message = "Lyrics are required"))]
    pub lyrics: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub tune: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateHymnRequest {
    #[serde(default)]
    #[validate(range(min = 1))]
    pub number: Option<i32>,
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub author: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub lyrics: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub tune: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct HymnListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}
