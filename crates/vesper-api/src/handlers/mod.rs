//! HTTP handlers, one module per resource

pub mod analytics;
pub mod bible;
pub mod churches;
pub mod engagement;
pub mod forum;
pub mod health;
pub mod hymns;
pub mod media;
pub mod notifications;
pub mod playback;
pub mod polls;
pub mod prayers;
pub mod reports;
pub mod search;
pub mod songs;
