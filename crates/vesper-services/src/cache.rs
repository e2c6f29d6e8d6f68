//! Response cache
//!
//! Values are stored as JSON so one cache can hold every cached response type. Keys are built
//! with [`CacheKey`] so the same request always maps to the same key, and each
//! [`CacheClass`] carries its own time-to-live.

use std::future::Future;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use vesper_core::AppError;

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Option<JsonValue>;

    async fn set(&self, key: &str, value: JsonValue, ttl: Duration);

    /// Drop every entry whose key starts with `prefix`.
    async fn invalidate(&self, prefix: &str);
}

/// Kinds of cached data and how long each stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheClass {
    BibleChapter,
    AnalyticsDashboard,
    ChurchListing,
}

impl CacheClass {
    pub fn prefix(&self) -> &'static str {
        match self {
            CacheClass::BibleChapter => "bible:chapter",
            CacheClass::AnalyticsDashboard => "analytics:dashboard",
            CacheClass::ChurchListing => "churches:list",
        }
    }

    pub fn ttl(&self) -> Duration {
        match self {
            CacheClass::BibleChapter => Duration::from_secs(24 * 60 * 60),
            CacheClass::AnalyticsDashboard => Duration::from_secs(5 * 60),
            CacheClass::ChurchListing => Duration::from_secs(60 * 60),
        }
    }
}

/// Deterministic cache key: `<class prefix>:<part>:<part>...`, parts lowercased with `\` and
/// `:` escaped so distinct part lists never collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    class: CacheClass,
    key: String,
}

impl CacheKey {
    pub fn new<I, S>(class: CacheClass, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut key = class.prefix().to_string();
        for part in parts {
            key.push(':');
            for c in part.as_ref().trim().to_lowercase().chars() {
                if c == ':' || c == '\\' {
                    key.push('\\');
                }
                key.push(c);
            }
        }
        Self { class, key }
    }

    pub fn class(&self) -> CacheClass {
        self.class
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }
}

/// Return the cached value for `key`, or run `producer`, cache its result with the class TTL
/// and return it. Entries that no longer deserialize are treated as misses.
pub async fn get_or_set<T, F, Fut>(cache: &dyn Cache, key: &CacheKey, producer: F) -> Result<T, AppError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    if let Some(cached) = cache.get(key.as_str()).await {
        match serde_json::from_value::<T>(cached) {
            Ok(value) => {
                tracing::debug!(key = %key.as_str(), "Cache hit");
                return Ok(value);
            }
            Err(e) => {
                tracing::warn!(key = %key.as_str(), error = %e, "Discarding undecodable cache entry");
            }
        }
    }

    let value = producer().await?;
    match serde_json::to_value(&value) {
        Ok(json) => cache.set(key.as_str(), json, key.class().ttl()).await,
        Err(e) => tracing::warn!(key = %key.as_str(), error = %e, "Failed to serialize value for cache"),
    }
    Ok(value)
}

struct Entry {
    value: JsonValue,
    expires_at: Instant,
}

/// In-process LRU cache with per-entry expiry
pub struct InMemoryCache {
    entries: Mutex<LruCache<String, Entry>>,
}

impl InMemoryCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<JsonValue> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    async fn set(&self, key: &str, value: JsonValue, ttl: Duration) {
        let mut entries = self.entries.lock().await;
        entries.put(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn invalidate(&self, prefix: &str) {
        let mut entries = self.entries.lock().await;
        let stale: Vec<String> = entries
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect();
        for key in stale {
            entries.pop(&key);
        }
        tracing::debug!(prefix = %prefix, "Cache invalidated");
    }
}
