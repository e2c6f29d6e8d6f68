//! Domain route groups. Paths are relative to the API prefix.

use std::sync::Arc;

use axum::routing::{delete, get, patch, post, put};
use axum::Router;

use crate::handlers::{
    analytics, bible, churches, engagement, forum, health, hymns, media, notifications,
    playback, polls, prayers, reports, search, songs,
};
use crate::state::AppState;

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
}

/// Bible, hymns, songs, churches and unified search
pub fn content_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bible/translations", get(bible::list_translations))
        .route("/bible/books", get(bible::list_books))
        .route("/bible/search", get(bible::search_bible))
        .route("/bible/ai-search", get(bible::ai_search_bible))
        .route("/bible/{book}/{chapter}", get(bible::get_chapter))
        .route("/bible/{book}/{chapter}/{verse}", get(bible::get_verse))
        .route("/hymns", get(hymns::list_hymns).post(hymns::create_hymn))
        .route(
            "/hymns/{id}",
            get(hymns::get_hymn)
                .put(hymns::update_hymn)
                .delete(hymns::delete_hymn),
        )
        .route("/songs", get(songs::list_songs).post(songs::create_song))
        .route(
            "/songs/{id}",
            get(songs::get_song)
                .put(songs::update_song)
                .delete(songs::delete_song),
        )
        .route("/songs/{id}/download", post(songs::download_song))
        .route(
            "/churches",
            get(churches::list_churches).post(churches::create_church),
        )
        .route("/churches/nearby", get(churches::nearby_churches))
        .route(
            "/churches/{id}",
            get(churches::get_church)
                .put(churches::update_church)
                .delete(churches::delete_church),
        )
        .route("/search", get(search::unified_search))
}

/// Forum, polls and prayer wall
pub fn community_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/forums", get(forum::list_posts).post(forum::create_post))
        .route(
            "/forums/{id}",
            get(forum::get_post)
                .put(forum::update_post)
                .delete(forum::delete_post),
        )
        .route("/forums/{id}/like", post(forum::toggle_like))
        .route(
            "/forums/{id}/replies",
            get(forum::list_replies).post(forum::create_reply),
        )
        .route("/polls", get(polls::list_polls).post(polls::create_poll))
        .route("/polls/{id}", get(polls::get_poll))
        .route("/polls/{id}/vote", post(polls::vote))
        .route("/polls/{id}/close", post(polls::close_poll))
        .route(
            "/prayers",
            get(prayers::list_prayers).post(prayers::create_prayer),
        )
        .route("/prayers/search", get(prayers::search_prayers))
        .route(
            "/prayers/{id}",
            get(prayers::get_prayer)
                .put(prayers::update_prayer)
                .delete(prayers::delete_prayer),
        )
        .route("/prayers/{id}/pray", post(prayers::pray))
}

/// Media records, moderation, engagement, playback and analytics
pub fn media_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/media", get(media::list_media).post(media::create_media))
        .route(
            "/media/{id}",
            get(media::get_media)
                .put(media::update_media)
                .delete(media::delete_media),
        )
        .route("/media/{id}/report", post(reports::report_media))
        .route("/media/{id}/bookmark", post(engagement::toggle_bookmark))
        .route("/media/{id}/like", post(engagement::toggle_like))
        .route("/reports", get(reports::list_reports))
        .route("/reports/{id}", patch(reports::review_report))
        .route("/playback/start", post(playback::start_playback))
        .route("/playback/active", get(playback::active_session))
        .route("/playback/history", get(playback::playback_history))
        .route("/playback/{id}/progress", put(playback::update_progress))
        .route("/playback/{id}/pause", post(playback::pause_playback))
        .route("/playback/{id}/resume", post(playback::resume_playback))
        .route("/playback/{id}/end", post(playback::end_playback))
        .route("/analytics/dashboard", get(analytics::dashboard))
        .route("/analytics/media/{id}", get(analytics::media_analytics))
}

/// Per-user collections: bookmarks and notifications
pub fn account_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookmarks", get(engagement::list_bookmarks))
        .route(
            "/bookmarks/{id}",
            delete(engagement::delete_bookmark),
        )
        .route("/notifications", get(notifications::list_notifications))
        .route(
            "/notifications/unread-count",
            get(notifications::unread_count),
        )
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/{id}/read", patch(notifications::mark_read))
        .route(
            "/notifications/{id}",
            delete(notifications::delete_notification),
        )
}
