//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::price::Price;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuRecord {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagRecord {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DishRecord {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image: String,
}

/// A menu item as stored. `menu_id` is a denormalized copy and is never
/// consulted for membership; the linked dish's menu is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItemRecord {
    pub id: Uuid,
    pub category_id: Uuid,
    pub dish_id: Option<Uuid>,
    pub menu_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub image: String,
    pub available: bool,
}

/// A menu item joined with its dish, category and the dish's tag ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuEntry {
    pub item: MenuItemRecord,
    pub dish: DishRecord,
    pub category: CategoryRecord,
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SocialLinks {
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChefRecord {
    pub id: Uuid,
    pub name: String,
    pub bio: String,
    pub profile_image: String,
    pub social: SocialLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMemberRecord {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub profile_image: String,
    pub social: SocialLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestimonialRecord {
    pub id: Uuid,
    pub client_name: String,
    pub profession: Option<String>,
    pub content: String,
    pub image: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogPostRecord {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRecord {
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub email: String,
    pub content: String,
    pub is_approved: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactMessageRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub notification_sent: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsletterSubscriberRecord {
    pub id: Uuid,
    pub email: String,
    pub created_at: OffsetDateTime,
}
