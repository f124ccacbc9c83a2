//! Chefer cache system.
//!
//! Reference data (features, testimonials, team members, blog posts,
//! categories, chefs) is read through [`CacheThrough`], which keys entries by
//! kind, filter signature and limit and stores them in an injected
//! [`CacheBackend`] for a fixed TTL.
//!
//! ```toml
//! [cache]
//! enabled = true
//! capacity = 256
//! ttl_seconds = 900
//! ```

mod accessor;
mod config;
mod keys;
mod lock;
mod store;

pub use accessor::{CacheThrough, Cacheable};
pub use config::{CacheConfig, DEFAULT_TTL};
pub use keys::{CacheKey, CacheKind, FilterSignature};
pub use store::{CacheBackend, CacheError, CachedValue, MemoryCache};
