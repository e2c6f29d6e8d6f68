use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{BibleVerse, Hymn, Media, PrayerPostResponse, Song};

pub const DEFAULT_SEARCH_LIMIT: i64 = 5;
pub const MAX_SEARCH_LIMIT: i64 = 20;

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct UnifiedSearchQuery {
    pub q: Option<String>,
    /// Results per content type (default 5, max 20)
    pub limit: Option<i64>,
}

impl UnifiedSearchQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT)
    }
}

/// Top matches per content type
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnifiedSearchResults {
    pub query: String,
    pub hymns: Vec<Hymn>,
    pub songs: Vec<Song>,
    pub media: Vec<Media>,
    pub prayers: Vec<PrayerPostResponse>,
    pub verses: Vec<BibleVerse>,
}
