//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{
    BlogPostRecord, CategoryRecord, ChefRecord, CommentRecord, ContactMessageRecord, DishRecord,
    FeatureRecord, MenuEntry, MenuItemRecord, MenuRecord, NewsletterSubscriberRecord,
    SocialLinks, TagRecord, TeamMemberRecord, TestimonialRecord,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Optional narrowing applied to reference-data listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    pub search: Option<String>,
}

impl ContentFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Blank or whitespace-only terms mean "no filter".
    pub fn search(term: Option<&str>) -> Self {
        let search = term
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_string);
        Self { search }
    }

    /// Case-insensitive literal substring match over any of `fields`.
    pub fn matches(&self, fields: &[&str]) -> bool {
        match &self.search {
            None => true,
            Some(term) => {
                let needle = term.to_lowercase();
                fields
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }
}

#[async_trait]
pub trait CatalogRepo: Send + Sync {
    /// All menus in creation order (`created_at`, then id).
    async fn list_menus(&self) -> Result<Vec<MenuRecord>, RepoError>;

    async fn find_menu(&self, id: Uuid) -> Result<Option<MenuRecord>, RepoError>;

    /// Categories ordered by case-folded name, narrowed by name search.
    async fn list_categories(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<CategoryRecord>, RepoError>;

    /// Tags ordered by name.
    async fn list_tags(&self) -> Result<Vec<TagRecord>, RepoError>;

    async fn find_tag(&self, id: Uuid) -> Result<Option<TagRecord>, RepoError>;

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError>;

    /// Menu items whose linked dish belongs to `menu_id`, joined with dish,
    /// category and dish tag ids. Items without a dish are never returned.
    async fn list_menu_entries(&self, menu_id: Uuid) -> Result<Vec<MenuEntry>, RepoError>;

    async fn find_dish(&self, id: Uuid) -> Result<Option<DishRecord>, RepoError>;

    async fn list_dish_tags(&self, dish_id: Uuid) -> Result<Vec<TagRecord>, RepoError>;

    /// Dishes carrying `tag_id`, ordered by name.
    async fn list_dishes_by_tag(&self, tag_id: Uuid) -> Result<Vec<DishRecord>, RepoError>;
}

#[async_trait]
pub trait ContentRepo: Send + Sync {
    async fn list_features(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<FeatureRecord>, RepoError>;

    async fn find_feature(&self, id: Uuid) -> Result<Option<FeatureRecord>, RepoError>;

    async fn list_testimonials(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<TestimonialRecord>, RepoError>;

    async fn list_team_members(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<TeamMemberRecord>, RepoError>;

    async fn list_chefs(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<ChefRecord>, RepoError>;

    /// Newest first.
    async fn list_blog_posts(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<BlogPostRecord>, RepoError>;

    async fn find_blog_post(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError>;

    /// Approved comments for a post, oldest first.
    async fn list_approved_comments(&self, post_id: Uuid)
    -> Result<Vec<CommentRecord>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateContactMessageParams {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct CreateCommentParams {
    pub post_id: Uuid,
    pub name: String,
    pub email: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct SubscribeOutcome {
    pub subscriber: NewsletterSubscriberRecord,
    pub created: bool,
}

#[async_trait]
pub trait IntakeRepo: Send + Sync {
    async fn create_contact_message(
        &self,
        params: CreateContactMessageParams,
    ) -> Result<ContactMessageRecord, RepoError>;

    async fn mark_notification_sent(&self, id: Uuid) -> Result<(), RepoError>;

    /// Get-or-create on the (already lower-cased) address.
    async fn subscribe(&self, email: &str) -> Result<SubscribeOutcome, RepoError>;

    async fn list_subscribers(&self) -> Result<Vec<NewsletterSubscriberRecord>, RepoError>;

    /// Stored unapproved.
    async fn create_comment(&self, params: CreateCommentParams)
    -> Result<CommentRecord, RepoError>;
}

/// Fully resolved catalog and reference content ready to be written.
#[derive(Debug, Clone, Default)]
pub struct ImportPlan {
    pub menus: Vec<MenuRecord>,
    pub categories: Vec<CategoryRecord>,
    pub tags: Vec<TagRecord>,
    pub dishes: Vec<PlannedDish>,
    pub items: Vec<MenuItemRecord>,
    pub features: Vec<FeatureRecord>,
    pub chefs: Vec<ChefRecord>,
    pub team_members: Vec<TeamMemberRecord>,
    pub testimonials: Vec<TestimonialRecord>,
    pub blog_posts: Vec<BlogPostRecord>,
}

#[derive(Debug, Clone)]
pub struct PlannedDish {
    pub dish: DishRecord,
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub menus: usize,
    pub categories: usize,
    pub tags: usize,
    pub dishes: usize,
    pub items: usize,
    pub content: usize,
    pub blog_posts: usize,
}

#[async_trait]
pub trait CatalogImportRepo: Send + Sync {
    /// Replace catalog and reference content in one transaction. Blog posts
    /// are upserted by id so existing comments survive.
    async fn apply_import(&self, plan: &ImportPlan) -> Result<ImportSummary, RepoError>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}

/// Social links from optional, possibly blank, columns.
pub fn social_links(
    twitter: Option<String>,
    facebook: Option<String>,
    linkedin: Option<String>,
) -> SocialLinks {
    let keep = |value: Option<String>| value.filter(|url| !url.trim().is_empty());
    SocialLinks {
        twitter: keep(twitter),
        facebook: keep(facebook),
        linkedin: keep(linkedin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_no_filter() {
        assert_eq!(ContentFilter::search(Some("   ")), ContentFilter::all());
        assert_eq!(ContentFilter::search(None), ContentFilter::all());
    }

    #[test]
    fn search_matches_case_insensitively_and_literally() {
        let filter = ContentFilter::search(Some(" SALAD "));
        assert!(filter.matches(&["Green Salad"]));
        assert!(!filter.matches(&["Steak"]));

        let pattern = ContentFilter::search(Some("50%_off"));
        assert!(pattern.matches(&["today: 50%_off brunch"]));
        assert!(!pattern.matches(&["50 percent off"]));
    }

    #[test]
    fn social_links_drop_blank_urls() {
        let links = social_links(Some(" ".into()), Some("https://fb.example/chef".into()), None);
        assert_eq!(links.twitter, None);
        assert_eq!(links.facebook.as_deref(), Some("https://fb.example/chef"));
    }
}
