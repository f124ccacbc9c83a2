use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{CatalogRepo, ContentFilter, RepoError},
    domain::entities::{
        CategoryRecord, DishRecord, MenuEntry, MenuItemRecord, MenuRecord, TagRecord,
    },
};

use super::{PostgresRepositories, map_sqlx_error, price_from_column};

#[derive(sqlx::FromRow)]
struct MenuRow {
    id: Uuid,
    name: String,
    description: String,
    created_at: OffsetDateTime,
}

impl From<MenuRow> for MenuRecord {
    fn from(row: MenuRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
}

#[derive(sqlx::FromRow)]
struct TagRow {
    id: Uuid,
    slug: String,
    name: String,
}

impl From<TagRow> for TagRecord {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DishRow {
    id: Uuid,
    menu_id: Uuid,
    name: String,
    description: String,
    price_cents: i64,
    image: String,
}

impl TryFrom<DishRow> for DishRecord {
    type Error = RepoError;

    fn try_from(row: DishRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            menu_id: row.menu_id,
            name: row.name,
            description: row.description,
            price: price_from_column(row.price_cents)?,
            image: row.image,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MenuEntryRow {
    item_id: Uuid,
    item_menu_id: Option<Uuid>,
    item_title: String,
    item_description: String,
    item_price_cents: i64,
    item_image: String,
    item_available: bool,
    dish_id: Uuid,
    dish_menu_id: Uuid,
    dish_name: String,
    dish_description: String,
    dish_price_cents: i64,
    dish_image: String,
    category_id: Uuid,
    category_name: String,
    tag_ids: Vec<Uuid>,
}

impl TryFrom<MenuEntryRow> for MenuEntry {
    type Error = RepoError;

    fn try_from(row: MenuEntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            item: MenuItemRecord {
                id: row.item_id,
                category_id: row.category_id,
                dish_id: Some(row.dish_id),
                menu_id: row.item_menu_id,
                title: row.item_title,
                description: row.item_description,
                price: price_from_column(row.item_price_cents)?,
                image: row.item_image,
                available: row.item_available,
            },
            dish: DishRecord {
                id: row.dish_id,
                menu_id: row.dish_menu_id,
                name: row.dish_name,
                description: row.dish_description,
                price: price_from_column(row.dish_price_cents)?,
                image: row.dish_image,
            },
            category: CategoryRecord {
                id: row.category_id,
                name: row.category_name,
            },
            tag_ids: row.tag_ids,
        })
    }
}

fn dishes_from_rows(rows: Vec<DishRow>) -> Result<Vec<DishRecord>, RepoError> {
    rows.into_iter().map(DishRecord::try_from).collect()
}

#[async_trait]
impl CatalogRepo for PostgresRepositories {
    async fn list_menus(&self) -> Result<Vec<MenuRecord>, RepoError> {
        let rows = sqlx::query_as::<_, MenuRow>(
            r#"
            SELECT id, name, description, created_at
            FROM menus
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(MenuRecord::from).collect())
    }

    async fn find_menu(&self, id: Uuid) -> Result<Option<MenuRecord>, RepoError> {
        let row = sqlx::query_as::<_, MenuRow>(
            r#"
            SELECT id, name, description, created_at
            FROM menus
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(MenuRecord::from))
    }

    async fn list_categories(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<CategoryRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id, name FROM categories WHERE TRUE");
        Self::apply_search(&mut qb, "name", filter);
        qb.push(" ORDER BY lower(name) ASC, name ASC, id ASC");
        Self::apply_limit(&mut qb, limit);

        let rows = qb
            .build_query_as::<CategoryRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryRecord {
                id: row.id,
                name: row.name,
            })
            .collect())
    }

    async fn list_tags(&self) -> Result<Vec<TagRecord>, RepoError> {
        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT id, slug, name
            FROM tags
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TagRecord::from).collect())
    }

    async fn find_tag(&self, id: Uuid) -> Result<Option<TagRecord>, RepoError> {
        let row = sqlx::query_as::<_, TagRow>("SELECT id, slug, name FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(TagRecord::from))
    }

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError> {
        let row = sqlx::query_as::<_, TagRow>("SELECT id, slug, name FROM tags WHERE slug = $1")
            .bind(slug)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(TagRecord::from))
    }

    async fn list_menu_entries(&self, menu_id: Uuid) -> Result<Vec<MenuEntry>, RepoError> {
        let rows = sqlx::query_as::<_, MenuEntryRow>(
            r#"
            SELECT
                mi.id AS item_id,
                mi.menu_id AS item_menu_id,
                mi.title AS item_title,
                mi.description AS item_description,
                mi.price_cents AS item_price_cents,
                mi.image AS item_image,
                mi.available AS item_available,
                d.id AS dish_id,
                d.menu_id AS dish_menu_id,
                d.name AS dish_name,
                d.description AS dish_description,
                d.price_cents AS dish_price_cents,
                d.image AS dish_image,
                c.id AS category_id,
                c.name AS category_name,
                ARRAY(
                    SELECT dt.tag_id FROM dish_tags dt WHERE dt.dish_id = d.id ORDER BY dt.tag_id
                ) AS tag_ids
            FROM menu_items mi
            INNER JOIN dishes d ON d.id = mi.dish_id
            INNER JOIN categories c ON c.id = mi.category_id
            WHERE d.menu_id = $1
            ORDER BY lower(c.name) ASC, c.name ASC, c.id ASC, mi.title ASC, mi.id ASC
            "#,
        )
        .bind(menu_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(MenuEntry::try_from).collect()
    }

    async fn find_dish(&self, id: Uuid) -> Result<Option<DishRecord>, RepoError> {
        let row = sqlx::query_as::<_, DishRow>(
            r#"
            SELECT id, menu_id, name, description, price_cents, image
            FROM dishes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(DishRecord::try_from).transpose()
    }

    async fn list_dish_tags(&self, dish_id: Uuid) -> Result<Vec<TagRecord>, RepoError> {
        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT t.id, t.slug, t.name
            FROM tags t
            INNER JOIN dish_tags dt ON dt.tag_id = t.id
            WHERE dt.dish_id = $1
            ORDER BY t.name ASC
            "#,
        )
        .bind(dish_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TagRecord::from).collect())
    }

    async fn list_dishes_by_tag(&self, tag_id: Uuid) -> Result<Vec<DishRecord>, RepoError> {
        let rows = sqlx::query_as::<_, DishRow>(
            r#"
            SELECT d.id, d.menu_id, d.name, d.description, d.price_cents, d.image
            FROM dishes d
            INNER JOIN dish_tags dt ON dt.dish_id = d.id
            WHERE dt.tag_id = $1
            ORDER BY d.name ASC, d.id ASC
            "#,
        )
        .bind(tag_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        dishes_from_rows(rows)
    }
}
