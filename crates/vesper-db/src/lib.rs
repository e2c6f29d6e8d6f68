//! Vesper Database Layer
//!
//! Query building, the generic table-backed resource store and the hand-written repositories
//! for every domain that needs more than CRUD.

pub mod db;

pub use db::query::{
    build_sort, build_text_search, execute_paginated_query, CompareOp, Condition, QueryOptions,
    SortSpec, SqlValue, TextSearch,
};
pub use db::resource::{ColumnValues, ListParams, PgResourceStore, ResourceTable};

pub use db::community::{
    ForumRepository, NotificationRepository, NotificationStore, PollRepository,
    PrayerRepository,
};
pub use db::content::{
    BibleRepository, ChurchRepository, SearchHits, SearchRepository, SongRepository,
};
pub use db::media::{
    AnalyticsRepository, EngagementRepository, EngagementStore, PlaybackRepository,
    PlaybackStore, ReportRepository, ReportStore, MEDIA_COLUMNS,
};
