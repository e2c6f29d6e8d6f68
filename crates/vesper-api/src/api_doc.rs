//! OpenAPI documentation served at `/api/openapi.json`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use crate::response;
use vesper_core::models;

/// Registers the `bearer_auth` JWT scheme referenced by protected operations.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vesper API",
        version = "0.1.0",
        description = "Faith content and community platform: Bible text and search, hymns, copyright-free songs, churches, forum, polls, prayer wall, media with moderation, playback tracking and analytics. All endpoints are versioned under /api/v1/."
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        handlers::health::health,
        handlers::health::ready,
        // Bible
        handlers::bible::list_translations,
        handlers::bible::list_books,
        handlers::bible::get_chapter,
        handlers::bible::get_verse,
        handlers::bible::search_bible,
        handlers::bible::ai_search_bible,
        // Hymns
        handlers::hymns::list_hymns,
        handlers::hymns::get_hymn,
        handlers::hymns::create_hymn,
        handlers::hymns::update_hymn,
        handlers::hymns::delete_hymn,
        // Songs
        handlers::songs::list_songs,
        handlers::songs::get_song,
        handlers::songs::create_song,
        handlers::songs::update_song,
        handlers::songs::delete_song,
        handlers::songs::download_song,
        // Churches
        handlers::churches::list_churches,
        handlers::churches::nearby_churches,
        handlers::churches::get_church,
        handlers::churches::create_church,
        handlers::churches::update_church,
        handlers::churches::delete_church,
        // Search
        handlers::search::unified_search,
        // Forum
        handlers::forum::list_posts,
        handlers::forum::get_post,
        handlers::forum::create_post,
        handlers::forum::update_post,
        handlers::forum::delete_post,
        handlers::forum::toggle_like,
        handlers::forum::list_replies,
        handlers::forum::create_reply,
        // Polls
        handlers::polls::list_polls,
        handlers::polls::get_poll,
        handlers::polls::create_poll,
        handlers::polls::vote,
        handlers::polls::close_poll,
        // Prayers
        handlers::prayers::list_prayers,
        handlers::prayers::search_prayers,
        handlers::prayers::get_prayer,
        handlers::prayers::create_prayer,
        handlers::prayers::update_prayer,
        handlers::prayers::delete_prayer,
        handlers::prayers::pray,
        // Media
        handlers::media::list_media,
        handlers::media::get_media,
        handlers::media::create_media,
        handlers::media::update_media,
        handlers::media::delete_media,
        // Reports
        handlers::reports::report_media,
        handlers::reports::list_reports,
        handlers::reports::review_report,
        // Engagement
        handlers::engagement::toggle_bookmark,
        handlers::engagement::toggle_like,
        handlers::engagement::list_bookmarks,
        handlers::engagement::delete_bookmark,
        // Playback
        handlers::playback::start_playback,
        handlers::playback::update_progress,
        handlers::playback::pause_playback,
        handlers::playback::resume_playback,
        handlers::playback::end_playback,
        handlers::playback::active_session,
        handlers::playback::playback_history,
        // Notifications
        handlers::notifications::list_notifications,
        handlers::notifications::unread_count,
        handlers::notifications::mark_read,
        handlers::notifications::mark_all_read,
        handlers::notifications::delete_notification,
        // Analytics
        handlers::analytics::dashboard,
        handlers::analytics::media_analytics,
    ),
    components(
        schemas(
            // Bible
            models::BibleVerse,
            models::BibleBook,
            models::BibleTranslation,
            models::BibleChapter,
            models::AiVerseResult,
            models::AiSearchSource,
            models::AiSearchResponse,
            // Hymns, songs, churches
            models::Hymn,
            models::CreateHymnRequest,
            models::UpdateHymnRequest,
            models::Song,
            models::CreateSongRequest,
            models::UpdateSongRequest,
            models::SongDownload,
            models::Church,
            models::ChurchWithDistance,
            models::CreateChurchRequest,
            models::UpdateChurchRequest,
            models::UnifiedSearchResults,
            // Community
            models::ForumPost,
            models::ForumReply,
            models::CreateForumPostRequest,
            models::UpdateForumPostRequest,
            models::CreateForumReplyRequest,
            models::Poll,
            models::PollOptionResult,
            models::PollWithResults,
            models::CreatePollRequest,
            models::VoteRequest,
            models::PrayerPostResponse,
            models::CreatePrayerRequest,
            models::UpdatePrayerRequest,
            models::Notification,
            models::NotificationKind,
            models::UnreadCount,
            // Media
            models::Media,
            models::MediaType,
            models::ModerationStatus,
            models::CreateMediaRequest,
            models::UpdateMediaRequest,
            models::MediaReport,
            models::ReportReason,
            models::ReportStatus,
            models::CreateReportRequest,
            models::ReviewReportRequest,
            models::Bookmark,
            models::BookmarkWithMedia,
            models::ToggleResult,
            // Playback
            models::PlaybackSession,
            models::EndReason,
            models::StartPlaybackRequest,
            models::UpdateProgressRequest,
            models::EndPlaybackRequest,
            models::StartPlaybackResponse,
            models::ResumePlaybackResponse,
            models::EndPlaybackResponse,
            // Analytics
            models::PlatformTotals,
            models::TopMedia,
            models::DailyViews,
            models::DashboardStats,
            models::MediaAnalytics,
            // Envelopes
            models::PaginationMeta,
            response::Acknowledgement,
            handlers::health::HealthStatus,
            handlers::notifications::MarkedRead,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "bible", description = "Bible translations, chapters, verses, keyword and AI search"),
        (name = "hymns", description = "Hymnal"),
        (name = "songs", description = "Copyright-free songs"),
        (name = "churches", description = "Church directory and nearby search"),
        (name = "search", description = "Unified search across content types"),
        (name = "forum", description = "Forum posts, likes and replies"),
        (name = "polls", description = "Community polls"),
        (name = "prayers", description = "Prayer wall and relevance search"),
        (name = "media", description = "Media records"),
        (name = "reports", description = "Media reports and moderation review"),
        (name = "engagement", description = "Bookmarks and likes"),
        (name = "playback", description = "Playback sessions and history"),
        (name = "notifications", description = "In-app notifications"),
        (name = "analytics", description = "Platform and media analytics")
    )
)]
pub struct ApiDoc;
