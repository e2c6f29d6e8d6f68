use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PrayerPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub scripture_reference: Option<String>,
    pub is_anonymous: bool,
    pub prayer_count: i64,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a prayer post. Anonymous posts hide the author from everyone but the
/// author and staff.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrayerPostResponse {
    pub id: Uuid,
    pub author_id: Option<Uuid>,
    pub content: String,
    pub scripture_reference: Option<String>,
    pub is_anonymous: bool,
    pub prayer_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
}

impl PrayerPostResponse {
    pub fn present(post: PrayerPost, viewer: Option<(Uuid, bool)>) -> Self {
        let reveal = !post.is_anonymous
            || viewer.map_or(false, |(id, is_staff)| is_staff || id == post.author_id);
        Self {
            id: post.id,
            author_id: reveal.then_some(post.author_id),
            content: post.content,
            scripture_reference: post.scripture_reference,
            is_anonymous: post.is_anonymous,
            prayer_count: post.prayer_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
            relevance: None,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePrayerRequest {
    #[validate(length(min = 1, max = 5000, message = "Content must be between 1 and 5000 characters"))]
    pub content: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub scripture_reference: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdatePrayerRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 5000))]
    pub content: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub scripture_reference: Option<String>,
    #[serde(default)]
    pub is_anonymous: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct PrayerListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct PrayerSearchQuery {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(anonymous: bool) -> PrayerPost {
        PrayerPost {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            content: "Pray for my family".to_string(),
            scripture_reference: None,
            is_anonymous: anonymous,
            prayer_count: 0,
            is_deleted: false,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn anonymous_author_is_hidden_from_strangers() {
        let p = post(true);
        let author = p.author_id;
        assert_eq!(PrayerPostResponse::present(p.clone(), None).author_id, None);
        assert_eq!(
            PrayerPostResponse::present(p.clone(), Some((Uuid::new_v4(), false))).author_id,
            None
        );
        assert_eq!(
            PrayerPostResponse::present(p.clone(), Some((author, false))).author_id,
            Some(author)
        );
        assert_eq!(
            PrayerPostResponse::present(p, Some((Uuid::new_v4(), true))).author_id,
            Some(author)
        );
    }

    #[test]
    fn public_author_is_visible() {
        let p = post(false);
        let author = p.author_id;
        assert_eq!(PrayerPostResponse::present(p, None).author_id, Some(author));
    }
}
