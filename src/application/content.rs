//! Content pages backed by cached reference data.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::application::repos::{CatalogRepo, ContentFilter, ContentRepo, RepoError};
use crate::cache::{CacheError, CacheThrough, FilterSignature};
use crate::domain::entities::{
    BlogPostRecord, CategoryRecord, ChefRecord, CommentRecord, FeatureRecord, MenuRecord,
    TeamMemberRecord, TestimonialRecord,
};

const HOME_BLOG_LIMIT: u32 = 3;
const RECENT_POSTS_LIMIT: u32 = 5;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{entity} `{key}` not found")]
    NotFound { entity: &'static str, key: String },
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl ContentError {
    fn not_found(entity: &'static str, key: &str) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HomeContent {
    pub features: Arc<Vec<FeatureRecord>>,
    pub testimonials: Arc<Vec<TestimonialRecord>>,
    pub team_members: Arc<Vec<TeamMemberRecord>>,
    pub menus: Vec<MenuRecord>,
    pub blog_posts: Arc<Vec<BlogPostRecord>>,
    pub chefs: Arc<Vec<ChefRecord>>,
    pub categories: Arc<Vec<CategoryRecord>>,
}

#[derive(Debug, Clone)]
pub struct AboutContent {
    pub chefs: Arc<Vec<ChefRecord>>,
    pub features: Arc<Vec<FeatureRecord>>,
}

#[derive(Debug, Clone)]
pub struct TeamContent {
    pub team_members: Arc<Vec<TeamMemberRecord>>,
    pub chefs: Arc<Vec<ChefRecord>>,
}

#[derive(Debug, Clone)]
pub struct BlogListing {
    pub posts: Arc<Vec<BlogPostRecord>>,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BlogPostDetail {
    pub post: BlogPostRecord,
    pub comments: Vec<CommentRecord>,
    pub recent_posts: Arc<Vec<BlogPostRecord>>,
}

#[derive(Clone)]
pub struct ContentService {
    content: Arc<dyn ContentRepo>,
    catalog: Arc<dyn CatalogRepo>,
    cache: CacheThrough,
}

impl ContentService {
    pub fn new(
        content: Arc<dyn ContentRepo>,
        catalog: Arc<dyn CatalogRepo>,
        cache: CacheThrough,
    ) -> Self {
        Self {
            content,
            catalog,
            cache,
        }
    }

    #[instrument(skip(self))]
    pub async fn home(&self) -> Result<HomeContent, ContentError> {
        let all = ContentFilter::all();
        Ok(HomeContent {
            features: self.features(&all).await?,
            testimonials: self.testimonials(&all).await?,
            team_members: self.team_members(&all).await?,
            menus: self.catalog.list_menus().await?,
            blog_posts: self.blog_posts(&all, Some(HOME_BLOG_LIMIT)).await?,
            chefs: self.chefs(&all).await?,
            categories: self.categories(&all).await?,
        })
    }

    pub async fn about(&self) -> Result<AboutContent, ContentError> {
        let all = ContentFilter::all();
        Ok(AboutContent {
            chefs: self.chefs(&all).await?,
            features: self.features(&all).await?,
        })
    }

    pub async fn team(&self) -> Result<TeamContent, ContentError> {
        let all = ContentFilter::all();
        Ok(TeamContent {
            team_members: self.team_members(&all).await?,
            chefs: self.chefs(&all).await?,
        })
    }

    pub async fn testimonial_list(&self) -> Result<Arc<Vec<TestimonialRecord>>, ContentError> {
        self.testimonials(&ContentFilter::all()).await
    }

    pub async fn feature_list(&self) -> Result<Arc<Vec<FeatureRecord>>, ContentError> {
        self.features(&ContentFilter::all()).await
    }

    /// Single features are read straight from the store.
    pub async fn feature(&self, raw_id: &str) -> Result<FeatureRecord, ContentError> {
        let id = parse_id("feature", raw_id)?;
        self.content
            .find_feature(id)
            .await?
            .ok_or_else(|| ContentError::not_found("feature", raw_id))
    }

    #[instrument(skip(self))]
    pub async fn blog(&self, search: Option<&str>) -> Result<BlogListing, ContentError> {
        let filter = ContentFilter::search(search);
        let posts = self.blog_posts(&filter, None).await?;
        Ok(BlogListing {
            posts,
            search: filter.search,
        })
    }

    #[instrument(skip(self))]
    pub async fn blog_post(&self, raw_id: &str) -> Result<BlogPostDetail, ContentError> {
        let post = self.find_post(raw_id).await?;
        let comments = self.content.list_approved_comments(post.id).await?;
        let recent_posts = self
            .blog_posts(&ContentFilter::all(), Some(RECENT_POSTS_LIMIT))
            .await?;
        Ok(BlogPostDetail {
            post,
            comments,
            recent_posts,
        })
    }

    pub async fn find_post(&self, raw_id: &str) -> Result<BlogPostRecord, ContentError> {
        let id = parse_id("blog post", raw_id)?;
        self.content
            .find_blog_post(id)
            .await?
            .ok_or_else(|| ContentError::not_found("blog post", raw_id))
    }

    async fn features(
        &self,
        filter: &ContentFilter,
    ) -> Result<Arc<Vec<FeatureRecord>>, ContentError> {
        self.cache
            .get(FilterSignature::from(filter), None, || async {
                Ok::<_, ContentError>(self.content.list_features(filter, None).await?)
            })
            .await
    }

    async fn testimonials(
        &self,
        filter: &ContentFilter,
    ) -> Result<Arc<Vec<TestimonialRecord>>, ContentError> {
        self.cache
            .get(FilterSignature::from(filter), None, || async {
                Ok::<_, ContentError>(self.content.list_testimonials(filter, None).await?)
            })
            .await
    }

    async fn team_members(
        &self,
        filter: &ContentFilter,
    ) -> Result<Arc<Vec<TeamMemberRecord>>, ContentError> {
        self.cache
            .get(FilterSignature::from(filter), None, || async {
                Ok::<_, ContentError>(self.content.list_team_members(filter, None).await?)
            })
            .await
    }

    async fn chefs(&self, filter: &ContentFilter) -> Result<Arc<Vec<ChefRecord>>, ContentError> {
        self.cache
            .get(FilterSignature::from(filter), None, || async {
                Ok::<_, ContentError>(self.content.list_chefs(filter, None).await?)
            })
            .await
    }

    async fn blog_posts(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Arc<Vec<BlogPostRecord>>, ContentError> {
        self.cache
            .get(FilterSignature::from(filter), limit, || async {
                Ok::<_, ContentError>(self.content.list_blog_posts(filter, limit).await?)
            })
            .await
    }

    async fn categories(
        &self,
        filter: &ContentFilter,
    ) -> Result<Arc<Vec<CategoryRecord>>, ContentError> {
        self.cache
            .get(FilterSignature::from(filter), None, || async {
                Ok::<_, ContentError>(self.catalog.list_categories(filter, None).await?)
            })
            .await
    }
}

fn parse_id(entity: &'static str, raw: &str) -> Result<Uuid, ContentError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ContentError::not_found(entity, raw))
}
