use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::application::repos::{CatalogImportRepo, ImportPlan, ImportSummary, RepoError};

use super::{PostgresRepositories, map_sqlx_error};

/// Tables rewritten by an import, children first. Blog posts are upserted
/// separately so their comments are kept.
const REPLACED_TABLES: [&str; 10] = [
    "menu_items",
    "dish_tags",
    "dishes",
    "tags",
    "categories",
    "menus",
    "features",
    "chefs",
    "team_members",
    "testimonials",
];

fn position(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

#[async_trait]
impl CatalogImportRepo for PostgresRepositories {
    async fn apply_import(&self, plan: &ImportPlan) -> Result<ImportSummary, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        for table in REPLACED_TABLES {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(tx.as_mut())
                .await
                .map_err(map_sqlx_error)?;
        }

        insert_catalog(&mut tx, plan).await?;
        insert_content(&mut tx, plan).await?;
        upsert_blog_posts(&mut tx, plan).await?;

        tx.commit().await.map_err(map_sqlx_error)?;

        let summary = ImportSummary {
            menus: plan.menus.len(),
            categories: plan.categories.len(),
            tags: plan.tags.len(),
            dishes: plan.dishes.len(),
            items: plan.items.len(),
            content: plan.features.len()
                + plan.chefs.len()
                + plan.team_members.len()
                + plan.testimonials.len(),
            blog_posts: plan.blog_posts.len(),
        };
        info!(?summary, "catalog import committed");
        Ok(summary)
    }
}

async fn insert_catalog(
    tx: &mut Transaction<'_, Postgres>,
    plan: &ImportPlan,
) -> Result<(), RepoError> {
    for menu in &plan.menus {
        sqlx::query(
            "INSERT INTO menus (id, name, description, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(menu.id)
        .bind(&menu.name)
        .bind(&menu.description)
        .bind(menu.created_at)
        .execute(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;
    }

    for category in &plan.categories {
        sqlx::query("INSERT INTO categories (id, name) VALUES ($1, $2)")
            .bind(category.id)
            .bind(&category.name)
            .execute(tx.as_mut())
            .await
            .map_err(map_sqlx_error)?;
    }

    for tag in &plan.tags {
        sqlx::query("INSERT INTO tags (id, slug, name) VALUES ($1, $2, $3)")
            .bind(tag.id)
            .bind(&tag.slug)
            .bind(&tag.name)
            .execute(tx.as_mut())
            .await
            .map_err(map_sqlx_error)?;
    }

    for planned in &plan.dishes {
        let dish = &planned.dish;
        sqlx::query(
            r#"
            INSERT INTO dishes (id, menu_id, name, description, price_cents, image)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(dish.id)
        .bind(dish.menu_id)
        .bind(&dish.name)
        .bind(&dish.description)
        .bind(dish.price.minor_units())
        .bind(&dish.image)
        .execute(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;

        for tag_id in &planned.tag_ids {
            sqlx::query(
                "INSERT INTO dish_tags (dish_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(dish.id)
            .bind(tag_id)
            .execute(tx.as_mut())
            .await
            .map_err(map_sqlx_error)?;
        }
    }

    for item in &plan.items {
        sqlx::query(
            r#"
            INSERT INTO menu_items
                (id, category_id, dish_id, menu_id, title, description, price_cents, image, available)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(item.id)
        .bind(item.category_id)
        .bind(item.dish_id)
        .bind(item.menu_id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.price.minor_units())
        .bind(&item.image)
        .bind(item.available)
        .execute(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;
    }

    Ok(())
}

async fn insert_content(
    tx: &mut Transaction<'_, Postgres>,
    plan: &ImportPlan,
) -> Result<(), RepoError> {
    for (index, feature) in plan.features.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO features (id, title, description, image, position)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(feature.id)
        .bind(&feature.title)
        .bind(&feature.description)
        .bind(&feature.image)
        .bind(position(index))
        .execute(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;
    }

    for (index, chef) in plan.chefs.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO chefs (id, name, bio, profile_image, twitter, facebook, linkedin, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(chef.id)
        .bind(&chef.name)
        .bind(&chef.bio)
        .bind(&chef.profile_image)
        .bind(chef.social.twitter.as_deref())
        .bind(chef.social.facebook.as_deref())
        .bind(chef.social.linkedin.as_deref())
        .bind(position(index))
        .execute(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;
    }

    for (index, member) in plan.team_members.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO team_members
                (id, name, role, profile_image, twitter, facebook, linkedin, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(member.id)
        .bind(&member.name)
        .bind(&member.role)
        .bind(&member.profile_image)
        .bind(member.social.twitter.as_deref())
        .bind(member.social.facebook.as_deref())
        .bind(member.social.linkedin.as_deref())
        .bind(position(index))
        .execute(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;
    }

    for testimonial in &plan.testimonials {
        sqlx::query(
            r#"
            INSERT INTO testimonials (id, client_name, profession, content, image, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(testimonial.id)
        .bind(&testimonial.client_name)
        .bind(testimonial.profession.as_deref())
        .bind(&testimonial.content)
        .bind(&testimonial.image)
        .bind(testimonial.created_at)
        .execute(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;
    }

    Ok(())
}

async fn upsert_blog_posts(
    tx: &mut Transaction<'_, Postgres>,
    plan: &ImportPlan,
) -> Result<(), RepoError> {
    for post in &plan.blog_posts {
        sqlx::query(
            r#"
            INSERT INTO blog_posts (id, title, content, image, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title,
                content = EXCLUDED.content,
                image = EXCLUDED.image,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.image)
        .bind(post.created_at)
        .execute(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;
    }

    Ok(())
}
