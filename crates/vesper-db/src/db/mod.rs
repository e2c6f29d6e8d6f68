//! Database repositories for data access layer
//!
//! `query` and `resource` are the generic pieces. Repositories are grouped by area:
//! content/ (bible, songs, churches, unified search), community/ (forum, polls, prayers,
//! notifications) and media/ (playback, reports, engagement, analytics).

pub mod query;
pub mod resource;

pub mod community;
pub mod content;
pub mod media;
