//! Cache configuration, built from the `[cache]` settings section.

use std::{num::NonZeroUsize, time::Duration};

const DEFAULT_CAPACITY: usize = 256;
/// Reference data is considered fresh for fifteen minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// When disabled every read goes to the store.
    pub enabled: bool,
    /// Maximum number of cached sequences before LRU eviction.
    pub capacity: usize,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CAPACITY,
            ttl: DEFAULT_TTL,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            capacity: settings.capacity.get() as usize,
            ttl: Duration::from_secs(u64::from(settings.ttl_seconds)),
        }
    }
}

impl CacheConfig {
    /// Returns the capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.capacity, 256);
        assert_eq!(config.ttl, Duration::from_secs(900));
    }

    #[test]
    fn capacity_clamps_to_min() {
        let config = CacheConfig {
            capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.capacity_non_zero().get(), 1);
    }
}
