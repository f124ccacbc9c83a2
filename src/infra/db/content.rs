use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{ContentFilter, ContentRepo, RepoError, social_links},
    domain::entities::{
        BlogPostRecord, ChefRecord, CommentRecord, FeatureRecord, TeamMemberRecord,
        TestimonialRecord,
    },
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct FeatureRow {
    id: Uuid,
    title: String,
    description: String,
    image: String,
}

impl From<FeatureRow> for FeatureRecord {
    fn from(row: FeatureRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            image: row.image,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ChefRow {
    id: Uuid,
    name: String,
    bio: String,
    profile_image: String,
    twitter: Option<String>,
    facebook: Option<String>,
    linkedin: Option<String>,
}

impl From<ChefRow> for ChefRecord {
    fn from(row: ChefRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            bio: row.bio,
            profile_image: row.profile_image,
            social: social_links(row.twitter, row.facebook, row.linkedin),
        }
    }
}

#[derive(sqlx::FromRow)]
struct TeamMemberRow {
    id: Uuid,
    name: String,
    role: String,
    profile_image: String,
    twitter: Option<String>,
    facebook: Option<String>,
    linkedin: Option<String>,
}

impl From<TeamMemberRow> for TeamMemberRecord {
    fn from(row: TeamMemberRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            role: row.role,
            profile_image: row.profile_image,
            social: social_links(row.twitter, row.facebook, row.linkedin),
        }
    }
}

#[derive(sqlx::FromRow)]
struct TestimonialRow {
    id: Uuid,
    client_name: String,
    profession: Option<String>,
    content: String,
    image: String,
    created_at: OffsetDateTime,
}

impl From<TestimonialRow> for TestimonialRecord {
    fn from(row: TestimonialRow) -> Self {
        Self {
            id: row.id,
            client_name: row.client_name,
            profession: row.profession.filter(|value| !value.trim().is_empty()),
            content: row.content,
            image: row.image,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BlogPostRow {
    id: Uuid,
    title: String,
    content: String,
    image: String,
    created_at: OffsetDateTime,
}

impl From<BlogPostRow> for BlogPostRecord {
    fn from(row: BlogPostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            image: row.image,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    name: String,
    email: String,
    content: String,
    is_approved: bool,
    created_at: OffsetDateTime,
}

impl From<CommentRow> for CommentRecord {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            name: row.name,
            email: row.email,
            content: row.content,
            is_approved: row.is_approved,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ContentRepo for PostgresRepositories {
    async fn list_features(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<FeatureRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, title, description, image FROM features WHERE TRUE",
        );
        Self::apply_search(&mut qb, "title", filter);
        qb.push(" ORDER BY position ASC, id ASC");
        Self::apply_limit(&mut qb, limit);

        let rows = qb
            .build_query_as::<FeatureRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(FeatureRecord::from).collect())
    }

    async fn find_feature(&self, id: Uuid) -> Result<Option<FeatureRecord>, RepoError> {
        let row = sqlx::query_as::<_, FeatureRow>(
            "SELECT id, title, description, image FROM features WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(FeatureRecord::from))
    }

    async fn list_testimonials(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<TestimonialRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT id, client_name, profession, content, image, created_at
            FROM testimonials
            WHERE TRUE
            "#,
        );
        Self::apply_search(&mut qb, "client_name", filter);
        qb.push(" ORDER BY created_at DESC, id ASC");
        Self::apply_limit(&mut qb, limit);

        let rows = qb
            .build_query_as::<TestimonialRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TestimonialRecord::from).collect())
    }

    async fn list_team_members(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<TeamMemberRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT id, name, role, profile_image, twitter, facebook, linkedin
            FROM team_members
            WHERE TRUE
            "#,
        );
        Self::apply_search(&mut qb, "name", filter);
        qb.push(" ORDER BY position ASC, id ASC");
        Self::apply_limit(&mut qb, limit);

        let rows = qb
            .build_query_as::<TeamMemberRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TeamMemberRecord::from).collect())
    }

    async fn list_chefs(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<ChefRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT id, name, bio, profile_image, twitter, facebook, linkedin
            FROM chefs
            WHERE TRUE
            "#,
        );
        Self::apply_search(&mut qb, "name", filter);
        qb.push(" ORDER BY position ASC, id ASC");
        Self::apply_limit(&mut qb, limit);

        let rows = qb
            .build_query_as::<ChefRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ChefRecord::from).collect())
    }

    async fn list_blog_posts(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<BlogPostRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, title, content, image, created_at FROM blog_posts WHERE TRUE",
        );
        if let Some(search) = filter.search.as_ref() {
            qb.push(" AND (position(lower(");
            qb.push_bind(search);
            qb.push(") in lower(title)) > 0 OR position(lower(");
            qb.push_bind(search);
            qb.push(") in lower(content)) > 0)");
        }
        qb.push(" ORDER BY created_at DESC, id ASC");
        Self::apply_limit(&mut qb, limit);

        let rows = qb
            .build_query_as::<BlogPostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(BlogPostRecord::from).collect())
    }

    async fn find_blog_post(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError> {
        let row = sqlx::query_as::<_, BlogPostRow>(
            "SELECT id, title, content, image, created_at FROM blog_posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(BlogPostRecord::from))
    }

    async fn list_approved_comments(
        &self,
        post_id: Uuid,
    ) -> Result<Vec<CommentRecord>, RepoError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, name, email, content, is_approved, created_at
            FROM comments
            WHERE post_id = $1 AND is_approved
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(CommentRecord::from).collect())
    }
}
