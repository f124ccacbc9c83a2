//! Catalog archive import.
//!
//! An archive is a TOML document naming menus, categories, tags, dishes,
//! menu items and the reference content shown on the site. Entries refer to
//! each other by key (falling back to the name), and [`plan_import`] resolves
//! those references into records with fresh ids before anything is written.

use std::collections::{HashMap, HashSet};
use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::application::repos::{
    CatalogImportRepo, ImportPlan, ImportSummary, PlannedDish, RepoError, social_links,
};
use crate::domain::entities::{
    BlogPostRecord, CategoryRecord, ChefRecord, DishRecord, FeatureRecord, MenuItemRecord,
    MenuRecord, TagRecord, TeamMemberRecord, TestimonialRecord,
};
use crate::domain::price::{Price, PriceError};
use crate::domain::slug::{SlugError, generate_unique_slug};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read archive: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid archive: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate {kind} key `{key}`")]
    DuplicateKey { kind: &'static str, key: String },
    #[error("{owner} `{name}` refers to unknown {kind} `{key}`")]
    UnknownReference {
        owner: &'static str,
        name: String,
        kind: &'static str,
        key: String,
    },
    #[error("{owner} `{name}` has an invalid price: {source}")]
    Price {
        owner: &'static str,
        name: String,
        #[source]
        source: PriceError,
    },
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogArchive {
    pub menus: Vec<ArchiveMenu>,
    pub categories: Vec<ArchiveCategory>,
    pub tags: Vec<ArchiveTag>,
    pub dishes: Vec<ArchiveDish>,
    pub menu_items: Vec<ArchiveMenuItem>,
    pub features: Vec<ArchiveFeature>,
    pub chefs: Vec<ArchivePerson>,
    pub team_members: Vec<ArchivePerson>,
    pub testimonials: Vec<ArchiveTestimonial>,
    pub blog_posts: Vec<ArchiveBlogPost>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveMenu {
    pub key: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveCategory {
    pub key: Option<String>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveTag {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveDish {
    pub key: Option<String>,
    pub menu: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveMenuItem {
    pub category: String,
    pub dish: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Defaults to the linked dish's price.
    pub price: Option<String>,
    #[serde(default)]
    pub image: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveFeature {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

/// Shared shape for chefs (`bio`) and team members (`role`).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchivePerson {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub profile_image: String,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveTestimonial {
    pub client_name: String,
    pub profession: Option<String>,
    pub content: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveBlogPost {
    /// Existing posts are updated in place when their id is given.
    pub id: Option<Uuid>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
}

pub fn parse_archive(source: &str) -> Result<CatalogArchive, ImportError> {
    Ok(toml::from_str(source)?)
}

/// Read, plan and apply an archive file.
pub async fn import_catalog(
    repo: &dyn CatalogImportRepo,
    path: &Path,
) -> Result<ImportSummary, ImportError> {
    let source = fs::read_to_string(path)?;
    let archive = parse_archive(&source)?;
    let plan = plan_import(archive, OffsetDateTime::now_utc())?;
    Ok(repo.apply_import(&plan).await?)
}

/// Resolve keys and derive ids, slugs and timestamps.
///
/// Menus and content records get creation timestamps one second apart in
/// archive order so that "creation order" matches the file.
pub fn plan_import(
    archive: CatalogArchive,
    now: OffsetDateTime,
) -> Result<ImportPlan, ImportError> {
    let menu_count = archive.menus.len();
    let mut menu_ids = HashMap::new();
    let mut menus = Vec::with_capacity(menu_count);
    for (index, menu) in archive.menus.into_iter().enumerate() {
        let key = menu.key.unwrap_or_else(|| menu.name.clone());
        let id = Uuid::new_v4();
        insert_unique(&mut menu_ids, "menu", key, id)?;
        menus.push(MenuRecord {
            id,
            name: menu.name,
            description: menu.description,
            created_at: sequence_stamp(now, index, menu_count),
        });
    }

    let mut category_ids = HashMap::new();
    let mut categories = Vec::with_capacity(archive.categories.len());
    for category in archive.categories {
        let key = category.key.unwrap_or_else(|| category.name.clone());
        let id = Uuid::new_v4();
        insert_unique(&mut category_ids, "category", key, id)?;
        categories.push(CategoryRecord {
            id,
            name: category.name,
        });
    }

    let mut tag_refs = HashMap::new();
    let mut used_slugs = HashSet::new();
    let mut tags = Vec::with_capacity(archive.tags.len());
    for tag in archive.tags {
        let slug = generate_unique_slug(&tag.name, |candidate| {
            !used_slugs.contains(candidate)
        })?;
        used_slugs.insert(slug.clone());
        let id = Uuid::new_v4();
        insert_unique(&mut tag_refs, "tag", tag.name.clone(), id)?;
        tags.push(TagRecord {
            id,
            slug,
            name: tag.name,
        });
    }

    let mut dish_refs: HashMap<String, (Uuid, Uuid, Price)> = HashMap::new();
    let mut dishes = Vec::with_capacity(archive.dishes.len());
    for dish in archive.dishes {
        let menu_id = resolve(&menu_ids, "dish", &dish.name, "menu", &dish.menu)?;
        let price = parse_price("dish", &dish.name, &dish.price)?;
        let tag_ids = dish
            .tags
            .iter()
            .map(|tag| resolve(&tag_refs, "dish", &dish.name, "tag", tag))
            .collect::<Result<Vec<_>, _>>()?;

        let id = Uuid::new_v4();
        let key = dish.key.unwrap_or_else(|| dish.name.clone());
        if dish_refs.contains_key(&key) {
            return Err(ImportError::DuplicateKey { kind: "dish", key });
        }
        dish_refs.insert(key, (id, menu_id, price));

        dishes.push(PlannedDish {
            dish: DishRecord {
                id,
                menu_id,
                name: dish.name,
                description: dish.description,
                price,
                image: dish.image,
            },
            tag_ids,
        });
    }

    let mut items = Vec::with_capacity(archive.menu_items.len());
    for item in archive.menu_items {
        let category_id = resolve(
            &category_ids,
            "menu item",
            &item.title,
            "category",
            &item.category,
        )?;
        let dish = match &item.dish {
            Some(key) => Some(dish_refs.get(key).copied().ok_or_else(|| {
                ImportError::UnknownReference {
                    owner: "menu item",
                    name: item.title.clone(),
                    kind: "dish",
                    key: key.clone(),
                }
            })?),
            None => None,
        };
        let price = match (&item.price, dish) {
            (Some(raw), _) => parse_price("menu item", &item.title, raw)?,
            (None, Some((_, _, dish_price))) => dish_price,
            (None, None) => {
                return Err(ImportError::Price {
                    owner: "menu item",
                    name: item.title,
                    source: PriceError::Empty,
                });
            }
        };

        items.push(MenuItemRecord {
            id: Uuid::new_v4(),
            category_id,
            dish_id: dish.map(|(id, _, _)| id),
            menu_id: dish.map(|(_, menu_id, _)| menu_id),
            title: item.title,
            description: item.description,
            price,
            image: item.image,
            available: item.available,
        });
    }

    let features = archive
        .features
        .into_iter()
        .map(|feature| FeatureRecord {
            id: Uuid::new_v4(),
            title: feature.title,
            description: feature.description,
            image: feature.image,
        })
        .collect();

    let chefs = archive
        .chefs
        .into_iter()
        .map(|chef| ChefRecord {
            id: Uuid::new_v4(),
            name: chef.name,
            bio: chef.bio,
            profile_image: chef.profile_image,
            social: social_links(chef.twitter, chef.facebook, chef.linkedin),
        })
        .collect();

    let team_members = archive
        .team_members
        .into_iter()
        .map(|member| TeamMemberRecord {
            id: Uuid::new_v4(),
            name: member.name,
            role: member.role,
            profile_image: member.profile_image,
            social: social_links(member.twitter, member.facebook, member.linkedin),
        })
        .collect();

    let testimonial_count = archive.testimonials.len();
    let testimonials = archive
        .testimonials
        .into_iter()
        .enumerate()
        .map(|(index, testimonial)| TestimonialRecord {
            id: Uuid::new_v4(),
            client_name: testimonial.client_name,
            profession: testimonial.profession.filter(|value| !value.trim().is_empty()),
            content: testimonial.content,
            image: testimonial.image,
            created_at: sequence_stamp(now, index, testimonial_count),
        })
        .collect();

    let post_count = archive.blog_posts.len();
    let blog_posts = archive
        .blog_posts
        .into_iter()
        .enumerate()
        .map(|(index, post)| BlogPostRecord {
            id: post.id.unwrap_or_else(Uuid::new_v4),
            title: post.title,
            content: post.content,
            image: post.image,
            created_at: post
                .published_at
                .unwrap_or_else(|| sequence_stamp(now, index, post_count)),
        })
        .collect();

    Ok(ImportPlan {
        menus,
        categories,
        tags,
        dishes,
        items,
        features,
        chefs,
        team_members,
        testimonials,
        blog_posts,
    })
}

/// The `index`-th of `count` timestamps ending at `now`, one second apart.
fn sequence_stamp(now: OffsetDateTime, index: usize, count: usize) -> OffsetDateTime {
    now - Duration::seconds(count.saturating_sub(index + 1) as i64)
}

fn insert_unique(
    map: &mut HashMap<String, Uuid>,
    kind: &'static str,
    key: String,
    id: Uuid,
) -> Result<(), ImportError> {
    if map.contains_key(&key) {
        return Err(ImportError::DuplicateKey { kind, key });
    }
    map.insert(key, id);
    Ok(())
}

fn resolve(
    map: &HashMap<String, Uuid>,
    owner: &'static str,
    name: &str,
    kind: &'static str,
    key: &str,
) -> Result<Uuid, ImportError> {
    map.get(key)
        .copied()
        .ok_or_else(|| ImportError::UnknownReference {
            owner,
            name: name.to_string(),
            kind,
            key: key.to_string(),
        })
}

fn parse_price(owner: &'static str, name: &str, raw: &str) -> Result<Price, ImportError> {
    raw.parse().map_err(|source| ImportError::Price {
        owner,
        name: name.to_string(),
        source,
    })
}
