//! Service initialization and application state setup

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use vesper_core::Config;
use vesper_db::{
    AnalyticsRepository, BibleRepository, ChurchRepository, EngagementRepository,
    ForumRepository, NotificationRepository, NotificationStore, PlaybackRepository,
    PollRepository, PrayerRepository, ReportRepository, SearchRepository, SongRepository,
};
use vesper_services::{
    AiSearchProvider, EmailService, EmailSink, EngagementService, EventDispatcher,
    EventPublisher, EventSink, HttpAiSearchProvider, InMemoryCache, ModerationService,
    NotificationSink, PlaybackService, RealtimeHub, RealtimeSink,
};

use crate::auth::JwtKeys;
use crate::state::{AppState, CommunityState, ContentState, MediaState};

/// Sinks the outbound event dispatcher fans out to. Email is only wired when SMTP is enabled.
fn event_sinks(
    config: &Config,
    notifications: Arc<dyn NotificationStore>,
    realtime: &RealtimeHub,
) -> Vec<Arc<dyn EventSink>> {
    let mut sinks: Vec<Arc<dyn EventSink>> = vec![
        Arc::new(NotificationSink::new(notifications.clone())),
        Arc::new(RealtimeSink::new(realtime.clone())),
    ];
    match EmailService::from_config(config.smtp()) {
        Some(email) => sinks.push(Arc::new(EmailSink::new(email, notifications))),
        None => tracing::info!("SMTP disabled, staff alerts will not be emailed"),
    }
    sinks
}

/// Initialize all services and repositories, returning the application state
pub async fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let notifications = NotificationRepository::new(pool.clone());
    let realtime = RealtimeHub::new();

    let (events, rx) = EventPublisher::channel(config.event_queue_capacity());
    let sinks = event_sinks(config, Arc::new(notifications.clone()), &realtime);
    tracing::info!(
        sinks = sinks.len(),
        queue_capacity = config.event_queue_capacity(),
        max_attempts = config.event_max_attempts(),
        "Outbound event dispatcher started"
    );
    EventDispatcher::new(sinks, config.event_max_attempts()).spawn(rx);

    let ai_search: Option<Arc<dyn AiSearchProvider>> =
        HttpAiSearchProvider::from_config(config.ai_search())
            .context("Failed to initialize AI search")?
            .map(|provider| Arc::new(provider) as Arc<dyn AiSearchProvider>);

    let content = ContentState {
        bible: BibleRepository::new(pool.clone()),
        songs: SongRepository::new(pool.clone()),
        churches: ChurchRepository::new(pool.clone()),
        search: SearchRepository::new(pool.clone()),
        ai_search,
    };

    let community = CommunityState {
        forum: ForumRepository::new(pool.clone()),
        polls: PollRepository::new(pool.clone()),
        prayers: PrayerRepository::new(pool.clone()),
        notifications,
    };

    let media = MediaState {
        playback: PlaybackService::new(
            Arc::new(PlaybackRepository::new(pool.clone())),
            config.playback_completion_threshold(),
        ),
        moderation: ModerationService::new(
            Arc::new(ReportRepository::new(pool.clone())),
            events.clone(),
            config.report_review_threshold(),
        ),
        engagement: EngagementService::new(Arc::new(EngagementRepository::new(pool.clone()))),
        analytics: AnalyticsRepository::new(pool.clone()),
    };

    tracing::info!(
        cache_capacity = config.cache_capacity(),
        completion_threshold = config.playback_completion_threshold(),
        report_threshold = config.report_review_threshold(),
        "Services initialized"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        jwt: JwtKeys::new(config.jwt_secret()),
        cache: Arc::new(InMemoryCache::new(config.cache_capacity())),
        pool,
        events,
        realtime,
        content,
        community,
        media,
    }))
}
