//! Read-through access to slowly changing reference data.
//!
//! A miss loads from the store, truncates to the requested limit and stores
//! the sequence for the configured TTL. Empty results are cached like any
//! other. Writes never purge entries; they age out.

use std::{future::Future, sync::Arc};

use metrics::counter;
use tracing::{debug, warn};

use crate::domain::entities::{
    BlogPostRecord, CategoryRecord, ChefRecord, FeatureRecord, TeamMemberRecord,
    TestimonialRecord,
};

use super::config::CacheConfig;
use super::keys::{CacheKey, CacheKind, FilterSignature};
use super::store::{CacheBackend, CacheError, CachedValue};

const METRIC_CACHE_HIT: &str = "chefer_cache_hit_total";
const METRIC_CACHE_MISS: &str = "chefer_cache_miss_total";

/// Records that can be stored as a cached sequence.
pub trait Cacheable: Clone + Send + Sync + Sized + 'static {
    const KIND: CacheKind;

    fn into_cached(items: Arc<Vec<Self>>) -> CachedValue;

    fn from_cached(value: CachedValue) -> Option<Arc<Vec<Self>>>;
}

#[derive(Clone)]
pub struct CacheThrough {
    backend: Arc<dyn CacheBackend>,
    config: CacheConfig,
}

impl CacheThrough {
    pub fn new(backend: Arc<dyn CacheBackend>, config: CacheConfig) -> Self {
        Self { backend, config }
    }

    /// Return the cached sequence for `T` under `filter` and `limit`, calling
    /// `load` on a miss. The loader may apply the limit itself; the result is
    /// truncated either way.
    pub async fn get<T, E, F, Fut>(
        &self,
        filter: FilterSignature,
        limit: Option<u32>,
        load: F,
    ) -> Result<Arc<Vec<T>>, E>
    where
        T: Cacheable,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        if !self.config.enabled {
            let items = load().await?;
            return Ok(Arc::new(apply_limit(items, limit)));
        }

        let key = CacheKey::new(T::KIND, filter, limit);

        if let Some(value) = self.backend.get(&key).await? {
            match T::from_cached(value) {
                Some(items) => {
                    counter!(METRIC_CACHE_HIT, "kind" => T::KIND.prefix()).increment(1);
                    debug!(key = %key, items = items.len(), "cache hit");
                    return Ok(items);
                }
                None => {
                    warn!(key = %key, "cached value has unexpected kind; reloading");
                }
            }
        }

        counter!(METRIC_CACHE_MISS, "kind" => T::KIND.prefix()).increment(1);
        let items = Arc::new(apply_limit(load().await?, limit));
        debug!(key = %key, items = items.len(), "cache miss; storing");

        self.backend
            .set(key, T::into_cached(Arc::clone(&items)), self.config.ttl)
            .await?;

        Ok(items)
    }
}

fn apply_limit<T>(mut items: Vec<T>, limit: Option<u32>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(limit as usize);
    }
    items
}

impl Cacheable for FeatureRecord {
    const KIND: CacheKind = CacheKind::Features;

    fn into_cached(items: Arc<Vec<Self>>) -> CachedValue {
        CachedValue::Features(items)
    }

    fn from_cached(value: CachedValue) -> Option<Arc<Vec<Self>>> {
        match value {
            CachedValue::Features(items) => Some(items),
            _ => None,
        }
    }
}

impl Cacheable for TestimonialRecord {
    const KIND: CacheKind = CacheKind::Testimonials;

    fn into_cached(items: Arc<Vec<Self>>) -> CachedValue {
        CachedValue::Testimonials(items)
    }

    fn from_cached(value: CachedValue) -> Option<Arc<Vec<Self>>> {
        match value {
            CachedValue::Testimonials(items) => Some(items),
            _ => None,
        }
    }
}

impl Cacheable for TeamMemberRecord {
    const KIND: CacheKind = CacheKind::TeamMembers;

    fn into_cached(items: Arc<Vec<Self>>) -> CachedValue {
        CachedValue::TeamMembers(items)
    }

    fn from_cached(value: CachedValue) -> Option<Arc<Vec<Self>>> {
        match value {
            CachedValue::TeamMembers(items) => Some(items),
            _ => None,
        }
    }
}

impl Cacheable for BlogPostRecord {
    const KIND: CacheKind = CacheKind::BlogPosts;

    fn into_cached(items: Arc<Vec<Self>>) -> CachedValue {
        CachedValue::BlogPosts(items)
    }

    fn from_cached(value: CachedValue) -> Option<Arc<Vec<Self>>> {
        match value {
            CachedValue::BlogPosts(items) => Some(items),
            _ => None,
        }
    }
}

impl Cacheable for CategoryRecord {
    const KIND: CacheKind = CacheKind::Categories;

    fn into_cached(items: Arc<Vec<Self>>) -> CachedValue {
        CachedValue::Categories(items)
    }

    fn from_cached(value: CachedValue) -> Option<Arc<Vec<Self>>> {
        match value {
            CachedValue::Categories(items) => Some(items),
            _ => None,
        }
    }
}

impl Cacheable for ChefRecord {
    const KIND: CacheKind = CacheKind::Chefs;

    fn into_cached(items: Arc<Vec<Self>>) -> CachedValue {
        CachedValue::Chefs(items)
    }

    fn from_cached(value: CachedValue) -> Option<Arc<Vec<Self>>> {
        match value {
            CachedValue::Chefs(items) => Some(items),
            _ => None,
        }
    }
}
