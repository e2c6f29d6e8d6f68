use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Why a playback session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "playback_end_reason", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Completed,
    Stopped,
    Navigated,
    Error,
}

impl Default for EndReason {
    fn default() -> Self {
        EndReason::Stopped
    }
}

/// A user's playback session for one media item.
///
/// Positions and durations are seconds. `total_watch_time` only grows while the session is
/// active: every transition out of the active state adds `now - last_active_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PlaybackSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub media_id: Uuid,
    pub duration: f64,
    pub current_position: f64,
    pub progress_percentage: f64,
    pub is_paused: bool,
    pub started_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub paused_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub end_reason: Option<EndReason>,
    pub total_watch_time: f64,
    pub device_info: Option<String>,
    pub user_agent: Option<String>,
    pub view_recorded: bool,
}

/// Append-only view record written when a session ends past the completion threshold.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MediaView {
    pub id: Uuid,
    pub media_id: Uuid,
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub watched_seconds: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartPlaybackRequest {
    pub media_id: Uuid,
    #[validate(range(exclusive_min = 0.0, message = "duration must be positive"))]
    pub duration: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "position must not be negative"))]
    pub position: Option<f64>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub device_info: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateProgressRequest {
    #[validate(range(min = 0.0, message = "position must not be negative"))]
    pub position: f64,
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0, message = "duration must be positive"))]
    pub duration: Option<f64>,
    #[serde(default)]
    pub progress_percentage: Option<f64>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct EndPlaybackRequest {
    #[serde(default)]
    pub reason: Option<EndReason>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "final_position must not be negative"))]
    pub final_position: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StartPlaybackResponse {
    pub session: PlaybackSession,
    /// The session that was active before this one started, now paused
    pub paused_session: Option<PlaybackSession>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResumePlaybackResponse {
    pub session: PlaybackSession,
    pub paused_session: Option<PlaybackSession>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EndPlaybackResponse {
    pub session: PlaybackSession,
    pub view_recorded: bool,
}

/// Values needed to open a new session row.
#[derive(Debug, Clone)]
pub struct NewPlaybackSession {
    pub user_id: Uuid,
    pub media_id: Uuid,
    pub duration: f64,
    pub position: f64,
    pub progress_percentage: f64,
    pub device_info: Option<String>,
    pub user_agent: Option<String>,
    pub started_at: DateTime<Utc>,
}
