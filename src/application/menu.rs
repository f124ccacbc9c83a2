//! Menu browsing: menu selection, search, tag filter and category paging.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::application::pagination::{MENU_PAGE_SIZE, PageWindow, parse_page_param};
use crate::application::repos::{CatalogRepo, ContentFilter, RepoError};
use crate::domain::entities::{CategoryRecord, DishRecord, MenuEntry, MenuRecord, TagRecord};

/// Raw query parameters for `/menu/`.
#[derive(Debug, Clone, Default)]
pub struct MenuQuery {
    pub menu: Option<String>,
    pub search: Option<String>,
    pub tag: Option<String>,
    pub category: Option<String>,
    pub page: Option<String>,
}

/// Filters applied to the items of each category on the current page.
#[derive(Debug, Clone, Default)]
pub struct ItemCriteria {
    pub search: ContentFilter,
    pub tag_id: Option<Uuid>,
}

impl ItemCriteria {
    fn accepts(&self, entry: &MenuEntry) -> bool {
        if let Some(tag_id) = self.tag_id
            && !entry.tag_ids.contains(&tag_id)
        {
            return false;
        }
        self.search.matches(&[
            &entry.item.title,
            &entry.item.description,
            &entry.dish.name,
            &entry.dish.description,
            &entry.category.name,
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuSection {
    pub category: CategoryRecord,
    pub items: Vec<MenuEntry>,
}

/// The paged, filtered grouping of one menu's entries.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuSections {
    pub sections: Vec<MenuSection>,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone)]
pub struct MenuPage {
    pub selected_menu: MenuRecord,
    pub menus: Vec<MenuRecord>,
    pub tags: Vec<TagRecord>,
    pub sections: Vec<MenuSection>,
    pub active_category_id: Option<Uuid>,
    pub search_query: Option<String>,
    pub tag_id: Option<Uuid>,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone)]
pub struct TaggedDishes {
    pub tag: TagRecord,
    pub dishes: Vec<DishRecord>,
}

#[derive(Debug, Clone)]
pub struct DishDetail {
    pub dish: DishRecord,
    pub menu: MenuRecord,
    pub tags: Vec<TagRecord>,
}

#[derive(Debug, Error)]
pub enum MenuQueryError {
    #[error("menu `{0}` not found")]
    UnknownMenu(String),
    #[error("no menus have been published")]
    NoMenus,
    #[error("tag `{0}` not found")]
    UnknownTag(String),
    #[error("dish `{0}` not found")]
    UnknownDish(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Group `entries` by category, page the categories and filter each page's
/// items.
///
/// Categories are ordered by case-folded name, then name, then id, matching
/// the `lower(name)` ordering of the catalog queries. Pagination counts every category
/// with at least one entry, but categories left empty by the filters are
/// dropped from the output.
pub fn build_menu_sections(
    entries: &[MenuEntry],
    criteria: &ItemCriteria,
    requested_page: Option<i64>,
) -> MenuSections {
    let mut grouped: BTreeMap<(String, &str, Uuid), (&CategoryRecord, Vec<&MenuEntry>)> =
        BTreeMap::new();
    for entry in entries {
        let name = entry.category.name.as_str();
        grouped
            .entry((name.to_lowercase(), name, entry.category.id))
            .or_insert_with(|| (&entry.category, Vec::new()))
            .1
            .push(entry);
    }

    let window = PageWindow::resolve(requested_page, grouped.len(), MENU_PAGE_SIZE);
    let range = window.range();

    let sections = grouped
        .into_values()
        .skip(range.start)
        .take(range.len())
        .filter_map(|(category, candidates)| {
            let mut items: Vec<MenuEntry> = candidates
                .into_iter()
                .filter(|entry| criteria.accepts(entry))
                .cloned()
                .collect();
            if items.is_empty() {
                return None;
            }
            items.sort_by(|a, b| {
                a.item
                    .title
                    .cmp(&b.item.title)
                    .then_with(|| a.item.id.cmp(&b.item.id))
            });
            Some(MenuSection {
                category: category.clone(),
                items,
            })
        })
        .collect();

    MenuSections {
        sections,
        current_page: window.current_page,
        total_pages: window.total_pages,
        has_previous: window.has_previous(),
        has_next: window.has_next(),
    }
}

#[derive(Clone)]
pub struct MenuQueryService {
    catalog: Arc<dyn CatalogRepo>,
}

impl MenuQueryService {
    pub fn new(catalog: Arc<dyn CatalogRepo>) -> Self {
        Self { catalog }
    }

    #[instrument(skip(self))]
    pub async fn menu_page(&self, query: MenuQuery) -> Result<MenuPage, MenuQueryError> {
        let menus = self.catalog.list_menus().await?;
        let selected_menu = select_menu(&menus, non_blank(query.menu.as_deref()))?;

        let tag_id = match non_blank(query.tag.as_deref()) {
            None => None,
            Some(raw) => Some(self.resolve_tag(raw).await?.id),
        };

        let search = ContentFilter::search(query.search.as_deref());
        let criteria = ItemCriteria {
            search: search.clone(),
            tag_id,
        };

        let entries = self.catalog.list_menu_entries(selected_menu.id).await?;
        let requested_page = parse_page_param(query.page.as_deref());
        let grouped = build_menu_sections(&entries, &criteria, requested_page);

        let active_category_id = non_blank(query.category.as_deref())
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .or_else(|| grouped.sections.first().map(|section| section.category.id));

        let tags = self.catalog.list_tags().await?;

        debug!(
            menu = %selected_menu.id,
            entries = entries.len(),
            sections = grouped.sections.len(),
            page = grouped.current_page,
            total_pages = grouped.total_pages,
            "menu page resolved"
        );

        Ok(MenuPage {
            selected_menu,
            menus,
            tags,
            sections: grouped.sections,
            active_category_id,
            search_query: search.search,
            tag_id,
            current_page: grouped.current_page,
            total_pages: grouped.total_pages,
            has_previous: grouped.has_previous,
            has_next: grouped.has_next,
        })
    }

    #[instrument(skip(self))]
    pub async fn dishes_by_tag(&self, slug: &str) -> Result<TaggedDishes, MenuQueryError> {
        let tag = self
            .catalog
            .find_tag_by_slug(slug)
            .await?
            .ok_or_else(|| MenuQueryError::UnknownTag(slug.to_string()))?;
        let dishes = self.catalog.list_dishes_by_tag(tag.id).await?;
        Ok(TaggedDishes { tag, dishes })
    }

    #[instrument(skip(self))]
    pub async fn dish_detail(&self, raw_id: &str) -> Result<DishDetail, MenuQueryError> {
        let unknown = || MenuQueryError::UnknownDish(raw_id.to_string());
        let id = Uuid::parse_str(raw_id).map_err(|_| unknown())?;
        let dish = self.catalog.find_dish(id).await?.ok_or_else(unknown)?;
        let menu = self
            .catalog
            .find_menu(dish.menu_id)
            .await?
            .ok_or_else(|| {
                MenuQueryError::Repo(RepoError::Integrity {
                    message: format!("dish {} references a missing menu", dish.id),
                })
            })?;
        let tags = self.catalog.list_dish_tags(dish.id).await?;
        Ok(DishDetail { dish, menu, tags })
    }

    async fn resolve_tag(&self, raw: &str) -> Result<TagRecord, MenuQueryError> {
        let unknown = || MenuQueryError::UnknownTag(raw.to_string());
        let id = Uuid::parse_str(raw).map_err(|_| unknown())?;
        self.catalog.find_tag(id).await?.ok_or_else(unknown)
    }
}

/// Resolve the requested menu, defaulting to the earliest created.
fn select_menu(
    menus: &[MenuRecord],
    requested: Option<&str>,
) -> Result<MenuRecord, MenuQueryError> {
    match requested {
        Some(raw) => {
            let unknown = || MenuQueryError::UnknownMenu(raw.to_string());
            let id = Uuid::parse_str(raw).map_err(|_| unknown())?;
            menus
                .iter()
                .find(|menu| menu.id == id)
                .cloned()
                .ok_or_else(unknown)
        }
        None => menus.first().cloned().ok_or(MenuQueryError::NoMenus),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
