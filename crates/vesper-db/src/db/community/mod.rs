//! Community repositories: forum, polls, prayer posts and notifications.

pub mod forum;
pub mod notifications;
pub mod polls;
pub mod prayers;

pub use forum::ForumRepository;
pub use notifications::{NotificationRepository, NotificationStore};
pub use polls::PollRepository;
pub use prayers::PrayerRepository;
