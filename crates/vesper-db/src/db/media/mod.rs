//! Media repositories: playback sessions and views, reports, bookmarks/likes, analytics.

pub mod analytics;
pub mod engagement;
pub mod playback;
pub mod reports;

pub use analytics::AnalyticsRepository;
pub use engagement::{EngagementRepository, EngagementStore};
pub use playback::{PlaybackRepository, PlaybackStore};
pub use reports::{ReportRepository, ReportStore};

/// Projection of the `media` table shared by the media repositories.
pub const MEDIA_COLUMNS: &str = "id, uploader_id, title, description, media_type, url, \
    duration_seconds, category, moderation_status, view_count, like_count, bookmark_count, \
    report_count, is_deleted, deleted_at, created_at, updated_at";
