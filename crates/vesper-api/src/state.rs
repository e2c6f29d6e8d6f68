//! Application state shared by every handler.
//!
//! Repositories and services are grouped by area so handlers reach for `state.content`,
//! `state.community` or `state.media` instead of one flat bag of fields.

use std::sync::Arc;

use sqlx::PgPool;
use vesper_core::Config;
use vesper_db::{
    AnalyticsRepository, BibleRepository, ChurchRepository, ForumRepository,
    NotificationRepository, PgResourceStore, PollRepository, PrayerRepository, SearchRepository,
    SongRepository,
};
use vesper_services::{
    AiSearchProvider, Cache, EngagementService, EventPublisher, ModerationService,
    PlaybackService, RealtimeHub,
};

use crate::auth::JwtKeys;
use crate::controller::{BaseController, Resource};

/// Bible text, songs, churches and unified search
#[derive(Clone)]
pub struct ContentState {
    pub bible: BibleRepository,
    pub songs: SongRepository,
    pub churches: ChurchRepository,
    pub search: SearchRepository,
    /// `None` when `AI_SEARCH_URL` is not configured
    pub ai_search: Option<Arc<dyn AiSearchProvider>>,
}

/// Forum, polls, prayer posts and notifications
#[derive(Clone)]
pub struct CommunityState {
    pub forum: ForumRepository,
    pub polls: PollRepository,
    pub prayers: PrayerRepository,
    pub notifications: NotificationRepository,
}

/// Playback, moderation, engagement and analytics
#[derive(Clone)]
pub struct MediaState {
    pub playback: PlaybackService,
    pub moderation: ModerationService,
    pub engagement: EngagementService,
    pub analytics: AnalyticsRepository,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub jwt: JwtKeys,
    pub cache: Arc<dyn Cache>,
    pub events: EventPublisher,
    pub realtime: RealtimeHub,
    pub content: ContentState,
    pub community: CommunityState,
    pub media: MediaState,
}

impl AppState {
    /// Generic CRUD controller for a table-backed resource
    pub(crate) fn resource<R: Resource>(&self) -> BaseController<R> {
        BaseController::new(PgResourceStore::new(self.pool.clone()))
    }
}
