//! Cache backends.
//!
//! `CacheBackend` is the seam services depend on; `MemoryCache` is the
//! in-process implementation built on an LRU map with per-entry expiry.

use std::{
    sync::{Arc, RwLock},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use lru::LruCache;
use metrics::counter;
use thiserror::Error;

use crate::domain::entities::{
    BlogPostRecord, CategoryRecord, ChefRecord, FeatureRecord, TeamMemberRecord,
    TestimonialRecord,
};

use super::config::CacheConfig;
use super::keys::CacheKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";
const METRIC_CACHE_EVICT: &str = "chefer_cache_evict_total";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store unavailable: {message}")]
    Unavailable { message: String },
}

impl CacheError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// A cached sequence of reference records.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Features(Arc<Vec<FeatureRecord>>),
    Testimonials(Arc<Vec<TestimonialRecord>>),
    TeamMembers(Arc<Vec<TeamMemberRecord>>),
    BlogPosts(Arc<Vec<BlogPostRecord>>),
    Categories(Arc<Vec<CategoryRecord>>),
    Chefs(Arc<Vec<ChefRecord>>),
}

#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<CachedValue>, CacheError>;

    async fn set(&self, key: CacheKey, value: CachedValue, ttl: Duration)
    -> Result<(), CacheError>;
}

struct Entry {
    value: CachedValue,
    expires_at: Instant,
}

pub struct MemoryCache {
    entries: RwLock<LruCache<CacheKey, Entry>>,
}

impl MemoryCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.capacity_non_zero())),
        }
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CachedValue>, CacheError> {
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        match entries.get(key) {
            None => return Ok(None),
            Some(entry) if Instant::now() < entry.expires_at => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => {}
        }
        entries.pop(key);
        Ok(None)
    }

    async fn set(
        &self,
        key: CacheKey,
        value: CachedValue,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let expires_at = Instant::now() + ttl;
        let kind = key.kind;
        let evicted =
            rw_write(&self.entries, SOURCE, "set").push(key.clone(), Entry { value, expires_at });
        if let Some((evicted_key, _)) = evicted
            && evicted_key != key
        {
            counter!(METRIC_CACHE_EVICT, "kind" => kind.prefix()).increment(1);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::cache::keys::{CacheKind, FilterSignature};

    fn features(titles: &[&str]) -> CachedValue {
        CachedValue::Features(Arc::new(
            titles
                .iter()
                .map(|title| FeatureRecord {
                    id: Uuid::new_v4(),
                    title: title.to_string(),
                    description: String::new(),
                    image: String::new(),
                })
                .collect(),
        ))
    }

    fn key(kind: CacheKind) -> CacheKey {
        CacheKey::new(kind, FilterSignature::unfiltered(), None)
    }

    fn feature_titles(value: Option<CachedValue>) -> Vec<String> {
        match value {
            Some(CachedValue::Features(items)) => {
                items.iter().map(|item| item.title.clone()).collect()
            }
            other => panic!("unexpected cached value: {other:?}"),
        }
    }

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let cache = MemoryCache::new(&CacheConfig::default());
        let key = key(CacheKind::Features);

        assert!(cache.get(&key).await.unwrap().is_none());
        cache
            .set(key.clone(), features(&["Fresh produce"]), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            feature_titles(cache.get(&key).await.unwrap()),
            vec!["Fresh produce"]
        );
    }

    #[tokio::test]
    async fn zero_ttl_entries_expire_immediately() {
        let cache = MemoryCache::new(&CacheConfig::default());
        let key = key(CacheKind::Features);

        cache
            .set(key.clone(), features(&["Stale"]), Duration::ZERO)
            .await
            .unwrap();

        assert!(cache.get(&key).await.unwrap().is_none());
        assert!(cache.is_empty(), "expired entry is dropped on read");
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_used() {
        let cache = MemoryCache::new(&CacheConfig {
            capacity: 1,
            ..Default::default()
        });
        let first = key(CacheKind::Features);
        let second = CacheKey::new(
            CacheKind::BlogPosts,
            FilterSignature::unfiltered(),
            Some(3),
        );

        cache
            .set(first.clone(), features(&["One"]), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set(
                second.clone(),
                CachedValue::BlogPosts(Arc::new(vec![BlogPostRecord {
                    id: Uuid::new_v4(),
                    title: "Spring menu".to_string(),
                    content: String::new(),
                    image: String::new(),
                    created_at: OffsetDateTime::UNIX_EPOCH,
                }])),
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        assert!(cache.get(&first).await.unwrap().is_none());
        assert!(cache.get(&second).await.unwrap().is_some());
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn poisoned_lock_is_recovered() {
        let cache = MemoryCache::new(&CacheConfig::default());

        let result = catch_unwind(AssertUnwindSafe(|| {
            let _guard = cache.entries.write().unwrap();
            panic!("poison");
        }));
        assert!(result.is_err());

        let key = key(CacheKind::Chefs);
        cache
            .set(
                key.clone(),
                CachedValue::Chefs(Arc::new(Vec::new())),
                Duration::from_secs(60),
            )
            .await
            .unwrap();
        assert!(cache.get(&key).await.unwrap().is_some());
    }
}
