//! Content repositories: Bible text, copyright-free songs, churches and unified search.

pub mod bible;
pub mod churches;
pub mod search;
pub mod songs;

pub use bible::BibleRepository;
pub use churches::ChurchRepository;
pub use search::{SearchHits, SearchRepository};
pub use songs::SongRepository;
