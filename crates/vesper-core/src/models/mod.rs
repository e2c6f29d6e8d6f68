//! Data models for the application
//!
//! Records mirror the database tables; request DTOs carry `validator` rules and are checked
//! by the controllers before any I/O happens.

mod analytics;
mod bible;
mod church;
mod engagement;
mod forum;
mod hymn;
mod media;
mod notification;
mod pagination;
mod playback;
mod poll;
mod prayer;
mod report;
mod search;
mod song;
mod user;

pub use analytics::*;
pub use bible::*;
pub use church::*;
pub use engagement::*;
pub use forum::*;
pub use hymn::*;
pub use media::*;
pub use notification::*;
pub use pagination::*;
pub use playback::*;
pub use poll::*;
pub use prayer::*;
pub use report::*;
pub use search::*;
pub use song::*;
pub use user::*;
