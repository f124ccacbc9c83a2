//! Cache key definitions.
//!
//! A key is the cached kind, a canonical filter signature and an optional
//! limit. Two requests share an entry only when all three agree.

use std::fmt;

use crate::application::repos::ContentFilter;

/// Reference data kinds served through the cache-through accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Features,
    Testimonials,
    TeamMembers,
    BlogPosts,
    Categories,
    Chefs,
}

impl CacheKind {
    pub const ALL: [CacheKind; 6] = [
        CacheKind::Features,
        CacheKind::Testimonials,
        CacheKind::TeamMembers,
        CacheKind::BlogPosts,
        CacheKind::Categories,
        CacheKind::Chefs,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            CacheKind::Features => "features",
            CacheKind::Testimonials => "testimonials",
            CacheKind::TeamMembers => "team_members",
            CacheKind::BlogPosts => "blog_posts",
            CacheKind::Categories => "categories",
            CacheKind::Chefs => "chefs",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Canonical text form of a content filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterSignature(String);

impl FilterSignature {
    pub fn unfiltered() -> Self {
        Self("all".to_string())
    }

    /// Search terms are case-folded so `Salad` and `salad` share an entry.
    pub fn search(term: &str) -> Self {
        Self(format!("search={}", term.trim().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&ContentFilter> for FilterSignature {
    fn from(filter: &ContentFilter) -> Self {
        match filter.search.as_deref() {
            Some(term) => Self::search(term),
            None => Self::unfiltered(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: CacheKind,
    pub filter: FilterSignature,
    pub limit: Option<u32>,
}

impl CacheKey {
    pub fn new(kind: CacheKind, filter: FilterSignature, limit: Option<u32>) -> Self {
        Self {
            kind,
            filter,
            limit,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.prefix(), self.filter.as_str())?;
        if let Some(limit) = self.limit {
            write!(f, ":{limit}")?;
        }
        Ok(())
    }
}
