//! Vesper Services
//!
//! Business logic that sits between the HTTP handlers and the repositories: the playback
//! session lifecycle, report moderation, bookmarks/likes, plus the collaborators they talk to
//! (cache, outbound events, email, realtime rooms, AI verse search).

pub mod ai_search;
pub mod cache;
pub mod email;
pub mod engagement;
pub mod events;
pub mod moderation;
pub mod playback;
pub mod realtime;

#[cfg(test)]
pub mod test_helpers;

pub use ai_search::{AiSearchProvider, HttpAiSearchProvider};
pub use cache::{get_or_set, Cache, CacheClass, CacheKey, InMemoryCache};
pub use email::EmailService;
pub use engagement::EngagementService;
pub use events::{
    EmailSink, EventDispatcher, EventPublisher, EventSink, NotificationSink, OutboundEvent,
    RealtimeSink,
};
pub use moderation::ModerationService;
pub use playback::PlaybackService;
pub use realtime::{RealtimeHub, RealtimeMessage};
