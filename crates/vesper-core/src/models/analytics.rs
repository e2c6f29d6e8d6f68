use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub const DEFAULT_DASHBOARD_DAYS: i32 = 30;
pub const MAX_DASHBOARD_DAYS: i32 = 365;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PlatformTotals {
    pub total_users: i64,
    pub total_media: i64,
    pub total_views: i64,
    pub active_sessions: i64,
    pub pending_reports: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TopMedia {
    pub id: Uuid,
    pub title: String,
    pub view_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DailyViews {
    pub day: NaiveDate,
    pub views: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub totals: PlatformTotals,
    pub top_media: Vec<TopMedia>,
    pub views_per_day: Vec<DailyViews>,
    pub days: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MediaAnalytics {
    pub media_id: Uuid,
    pub views: i64,
    pub unique_viewers: i64,
    pub likes: i64,
    pub bookmarks: i64,
    pub sessions: i64,
    /// Share of sessions that produced a view, in [0, 1]
    pub completion_rate: f64,
    /// Seconds
    pub average_watch_time: f64,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct DashboardQuery {
    pub days: Option<i32>,
}

impl DashboardQuery {
    pub fn days(&self) -> i32 {
        self.days
            .unwrap_or(DEFAULT_DASHBOARD_DAYS)
            .clamp(1, MAX_DASHBOARD_DAYS)
    }
}
