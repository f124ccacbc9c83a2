//! In-memory repositories, a recording mailer and a small restaurant fixture
//! shared by the integration tests.

#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::Router;
use chefer::{
    application::{
        chrome::ChromeService,
        content::ContentService,
        intake::{IntakeService, NotificationSettings},
        mail::{MailError, MailMessage, Mailer},
        menu::MenuQueryService,
        repos::{
            CatalogImportRepo, CatalogRepo, ContentFilter, ContentRepo, CreateCommentParams,
            CreateContactMessageParams, ImportPlan, ImportSummary, IntakeRepo, RepoError,
            StoreHealth, SubscribeOutcome,
        },
    },
    cache::{CacheConfig, CacheThrough, MemoryCache},
    config::SiteSettings,
    domain::{
        entities::{
            BlogPostRecord, CategoryRecord, ChefRecord, CommentRecord, ContactMessageRecord,
            DishRecord, FeatureRecord, MenuEntry, MenuItemRecord, MenuRecord,
            NewsletterSubscriberRecord, SocialLinks, TagRecord, TeamMemberRecord,
            TestimonialRecord,
        },
        price::Price,
    },
    infra::http::{HttpState, build_router},
};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

pub const ADMIN_ADDRESS: &str = "kitchen@chefer.test";

#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub menus: Vec<MenuRecord>,
    pub categories: Vec<CategoryRecord>,
    pub tags: Vec<TagRecord>,
    pub dishes: Vec<DishRecord>,
    pub dish_tags: Vec<(Uuid, Uuid)>,
    pub items: Vec<MenuItemRecord>,
    pub features: Vec<FeatureRecord>,
    pub chefs: Vec<ChefRecord>,
    pub team_members: Vec<TeamMemberRecord>,
    pub testimonials: Vec<TestimonialRecord>,
    pub blog_posts: Vec<BlogPostRecord>,
    pub comments: Vec<CommentRecord>,
    pub contact_messages: Vec<ContactMessageRecord>,
    pub subscribers: Vec<NewsletterSubscriberRecord>,
}

/// Every repository trait over one mutex-guarded state. `set_offline`
/// makes every call fail like a dropped database connection.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    offline: AtomicBool,
    content_loads: AtomicUsize,
}

impl MemoryStore {
    pub fn new(state: StoreState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
            ..Default::default()
        })
    }

    pub fn update(&self, change: impl FnOnce(&mut StoreState)) {
        change(&mut self.state.lock().unwrap());
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.lock().unwrap().clone()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of reference-content listings served by the store.
    pub fn content_loads(&self) -> usize {
        self.content_loads.load(Ordering::SeqCst)
    }

    fn read(&self) -> Result<std::sync::MutexGuard<'_, StoreState>, RepoError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepoError::Persistence("connection refused".to_string()));
        }
        Ok(self.state.lock().unwrap())
    }

    fn load_content(&self) -> Result<std::sync::MutexGuard<'_, StoreState>, RepoError> {
        let state = self.read()?;
        self.content_loads.fetch_add(1, Ordering::SeqCst);
        Ok(state)
    }
}

fn limited<T>(mut items: Vec<T>, limit: Option<u32>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(limit as usize);
    }
    items
}

#[async_trait]
impl CatalogRepo for MemoryStore {
    async fn list_menus(&self) -> Result<Vec<MenuRecord>, RepoError> {
        let mut menus = self.read()?.menus.clone();
        menus.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(menus)
    }

    async fn find_menu(&self, id: Uuid) -> Result<Option<MenuRecord>, RepoError> {
        Ok(self.read()?.menus.iter().find(|menu| menu.id == id).cloned())
    }

    async fn list_categories(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<CategoryRecord>, RepoError> {
        let mut categories: Vec<_> = self
            .load_content()?
            .categories
            .iter()
            .filter(|category| filter.matches(&[&category.name]))
            .cloned()
            .collect();
        categories.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
                .then(a.id.cmp(&b.id))
        });
        Ok(limited(categories, limit))
    }

    async fn list_tags(&self) -> Result<Vec<TagRecord>, RepoError> {
        let mut tags = self.read()?.tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_tag(&self, id: Uuid) -> Result<Option<TagRecord>, RepoError> {
        Ok(self.read()?.tags.iter().find(|tag| tag.id == id).cloned())
    }

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError> {
        Ok(self.read()?.tags.iter().find(|tag| tag.slug == slug).cloned())
    }

    async fn list_menu_entries(&self, menu_id: Uuid) -> Result<Vec<MenuEntry>, RepoError> {
        let state = self.read()?;
        let entries = state
            .items
            .iter()
            .filter_map(|item| {
                let dish = state
                    .dishes
                    .iter()
                    .find(|dish| Some(dish.id) == item.dish_id && dish.menu_id == menu_id)?;
                let category = state
                    .categories
                    .iter()
                    .find(|category| category.id == item.category_id)?;
                let tag_ids = state
                    .dish_tags
                    .iter()
                    .filter(|(dish_id, _)| *dish_id == dish.id)
                    .map(|(_, tag_id)| *tag_id)
                    .collect();
                Some(MenuEntry {
                    item: item.clone(),
                    dish: dish.clone(),
                    category: category.clone(),
                    tag_ids,
                })
            })
            .collect();
        Ok(entries)
    }

    async fn find_dish(&self, id: Uuid) -> Result<Option<DishRecord>, RepoError> {
        Ok(self.read()?.dishes.iter().find(|dish| dish.id == id).cloned())
    }

    async fn list_dish_tags(&self, dish_id: Uuid) -> Result<Vec<TagRecord>, RepoError> {
        let state = self.read()?;
        let mut tags: Vec<_> = state
            .tags
            .iter()
            .filter(|tag| state.dish_tags.contains(&(dish_id, tag.id)))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn list_dishes_by_tag(&self, tag_id: Uuid) -> Result<Vec<DishRecord>, RepoError> {
        let state = self.read()?;
        let mut dishes: Vec<_> = state
            .dishes
            .iter()
            .filter(|dish| state.dish_tags.contains(&(dish.id, tag_id)))
            .cloned()
            .collect();
        dishes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(dishes)
    }
}

#[async_trait]
impl ContentRepo for MemoryStore {
    async fn list_features(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<FeatureRecord>, RepoError> {
        let features = self
            .load_content()?
            .features
            .iter()
            .filter(|feature| filter.matches(&[&feature.title]))
            .cloned()
            .collect();
        Ok(limited(features, limit))
    }

    async fn find_feature(&self, id: Uuid) -> Result<Option<FeatureRecord>, RepoError> {
        Ok(self.read()?.features.iter().find(|f| f.id == id).cloned())
    }

    async fn list_testimonials(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<TestimonialRecord>, RepoError> {
        let mut testimonials: Vec<_> = self
            .load_content()?
            .testimonials
            .iter()
            .filter(|testimonial| filter.matches(&[&testimonial.client_name]))
            .cloned()
            .collect();
        testimonials.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(limited(testimonials, limit))
    }

    async fn list_team_members(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<TeamMemberRecord>, RepoError> {
        let members = self
            .load_content()?
            .team_members
            .iter()
            .filter(|member| filter.matches(&[&member.name]))
            .cloned()
            .collect();
        Ok(limited(members, limit))
    }

    async fn list_chefs(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<ChefRecord>, RepoError> {
        let chefs = self
            .load_content()?
            .chefs
            .iter()
            .filter(|chef| filter.matches(&[&chef.name]))
            .cloned()
            .collect();
        Ok(limited(chefs, limit))
    }

    async fn list_blog_posts(
        &self,
        filter: &ContentFilter,
        limit: Option<u32>,
    ) -> Result<Vec<BlogPostRecord>, RepoError> {
        let mut posts: Vec<_> = self
            .load_content()?
            .blog_posts
            .iter()
            .filter(|post| filter.matches(&[&post.title, &post.content]))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(limited(posts, limit))
    }

    async fn find_blog_post(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError> {
        Ok(self.read()?.blog_posts.iter().find(|p| p.id == id).cloned())
    }

    async fn list_approved_comments(
        &self,
        post_id: Uuid,
    ) -> Result<Vec<CommentRecord>, RepoError> {
        let mut comments: Vec<_> = self
            .read()?
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id && comment.is_approved)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }
}

#[async_trait]
impl IntakeRepo for MemoryStore {
    async fn create_contact_message(
        &self,
        params: CreateContactMessageParams,
    ) -> Result<ContactMessageRecord, RepoError> {
        let record = ContactMessageRecord {
            id: Uuid::new_v4(),
            name: params.name,
            email: params.email,
            subject: params.subject,
            message: params.message,
            is_read: false,
            notification_sent: false,
            created_at: OffsetDateTime::now_utc(),
        };
        self.read()?.contact_messages.push(record.clone());
        Ok(record)
    }

    async fn mark_notification_sent(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.read()?;
        let record = state
            .contact_messages
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(RepoError::NotFound)?;
        record.notification_sent = true;
        Ok(())
    }

    async fn subscribe(&self, email: &str) -> Result<SubscribeOutcome, RepoError> {
        let mut state = self.read()?;
        if let Some(existing) = state.subscribers.iter().find(|s| s.email == email) {
            return Ok(SubscribeOutcome {
                subscriber: existing.clone(),
                created: false,
            });
        }
        let subscriber = NewsletterSubscriberRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        state.subscribers.push(subscriber.clone());
        Ok(SubscribeOutcome {
            subscriber,
            created: true,
        })
    }

    async fn list_subscribers(&self) -> Result<Vec<NewsletterSubscriberRecord>, RepoError> {
        Ok(self.read()?.subscribers.clone())
    }

    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let comment = CommentRecord {
            id: Uuid::new_v4(),
            post_id: params.post_id,
            name: params.name,
            email: params.email,
            content: params.content,
            is_approved: false,
            created_at: OffsetDateTime::now_utc(),
        };
        self.read()?.comments.push(comment.clone());
        Ok(comment)
    }
}

#[async_trait]
impl CatalogImportRepo for MemoryStore {
    async fn apply_import(&self, plan: &ImportPlan) -> Result<ImportSummary, RepoError> {
        let mut state = self.read()?;
        state.menus = plan.menus.clone();
        state.categories = plan.categories.clone();
        state.tags = plan.tags.clone();
        state.dishes = plan.dishes.iter().map(|planned| planned.dish.clone()).collect();
        state.dish_tags = plan
            .dishes
            .iter()
            .flat_map(|planned| {
                planned
                    .tag_ids
                    .iter()
                    .map(move |tag_id| (planned.dish.id, *tag_id))
            })
            .collect();
        state.items = plan.items.clone();
        state.features = plan.features.clone();
        state.chefs = plan.chefs.clone();
        state.team_members = plan.team_members.clone();
        state.testimonials = plan.testimonials.clone();
        for post in &plan.blog_posts {
            match state.blog_posts.iter_mut().find(|p| p.id == post.id) {
                Some(existing) => *existing = post.clone(),
                None => state.blog_posts.push(post.clone()),
            }
        }

        Ok(ImportSummary {
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
        })
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> Result<(), RepoError> {
        self.read().map(|_| ())
    }
}

/// Records every message; sends to addresses listed in `failing` error out.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
    failing: Mutex<Vec<String>>,
}

impl RecordingMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_for(&self, address: &str) {
        self.failing.lock().unwrap().push(address.to_string());
    }

    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        if self.failing.lock().unwrap().contains(&message.to) {
            return Err(MailError::Transport("relay refused connection".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub fn site_settings() -> SiteSettings {
    SiteSettings {
        brand_title: "Chefer".to_string(),
        tagline: "Seasonal cooking, served daily".to_string(),
        footer_copy: "Chefer Restaurant".to_string(),
        public_url: "http://chefer.test".to_string(),
    }
}

pub fn content_service(store: &Arc<MemoryStore>, config: CacheConfig) -> ContentService {
    let cache = CacheThrough::new(Arc::new(MemoryCache::new(&config)), config);
    ContentService::new(store.clone(), store.clone(), cache)
}

pub fn intake_service(store: &Arc<MemoryStore>, mailer: &Arc<RecordingMailer>) -> IntakeService {
    IntakeService::new(
        store.clone(),
        store.clone(),
        mailer.clone(),
        NotificationSettings {
            admin_address: ADMIN_ADDRESS.to_string(),
            signature: "Chefer".to_string(),
        },
    )
}

pub fn app(store: &Arc<MemoryStore>, mailer: &Arc<RecordingMailer>) -> Router {
    let state = HttpState {
        menu: Arc::new(MenuQueryService::new(store.clone())),
        content: Arc::new(content_service(store, CacheConfig::default())),
        intake: Arc::new(intake_service(store, mailer)),
        chrome: Arc::new(ChromeService::new(&site_settings())),
        health: store.clone(),
    };
    build_router(state)
}

/// Handles to the records in [`restaurant`].
#[derive(Debug, Clone)]
pub struct Fixture {
    pub lunch: MenuRecord,
    pub dinner: MenuRecord,
    pub appetizers: CategoryRecord,
    pub mains: CategoryRecord,
    pub vegetarian: TagRecord,
    pub spicy: TagRecord,
    pub salad: DishRecord,
    pub chicken: DishRecord,
    pub steak: DishRecord,
    pub risotto: DishRecord,
    pub post: BlogPostRecord,
    pub feature: FeatureRecord,
}

fn price(minor_units: i64) -> Price {
    Price::from_minor_units(minor_units).unwrap()
}

fn dish(menu: &MenuRecord, name: &str, minor_units: i64) -> DishRecord {
    DishRecord {
        id: Uuid::new_v4(),
        menu_id: menu.id,
        name: name.to_string(),
        description: format!("{name}, prepared to order"),
        price: price(minor_units),
        image: String::new(),
    }
}

fn item(category: &CategoryRecord, dish: &DishRecord, title: &str) -> MenuItemRecord {
    MenuItemRecord {
        id: Uuid::new_v4(),
        category_id: category.id,
        dish_id: Some(dish.id),
        menu_id: Some(dish.menu_id),
        title: title.to_string(),
        description: String::new(),
        price: dish.price,
        image: String::new(),
        available: true,
    }
}

/// A lunch menu (appetizers and mains) created before a dinner menu.
pub fn restaurant() -> (StoreState, Fixture) {
    let now = OffsetDateTime::now_utc();
    let lunch = MenuRecord {
        id: Uuid::new_v4(),
        name: "Lunch Menu".to_string(),
        description: "Served from noon".to_string(),
        created_at: now - Duration::days(2),
    };
    let dinner = MenuRecord {
        id: Uuid::new_v4(),
        name: "Dinner Menu".to_string(),
        description: "Served from six".to_string(),
        created_at: now - Duration::days(1),
    };
    let appetizers = CategoryRecord {
        id: Uuid::new_v4(),
        name: "Appetizers".to_string(),
    };
    let mains = CategoryRecord {
        id: Uuid::new_v4(),
        name: "Main Courses".to_string(),
    };
    let vegetarian = TagRecord {
        id: Uuid::new_v4(),
        slug: "vegetarian".to_string(),
        name: "Vegetarian".to_string(),
    };
    let spicy = TagRecord {
        id: Uuid::new_v4(),
        slug: "spicy".to_string(),
        name: "Spicy".to_string(),
    };

    let salad = dish(&lunch, "Vegetarian Salad", 950);
    let chicken = dish(&lunch, "Spicy Chicken", 1450);
    let steak = dish(&lunch, "Beef Steak", 2400);
    let risotto = dish(&dinner, "Truffle Risotto", 1900);

    let mut risotto_item = item(&mains, &risotto, "Truffle Risotto");
    risotto_item.available = false;
    // Stale denormalized menu id: membership must follow the dish.
    risotto_item.menu_id = Some(lunch.id);

    let post = BlogPostRecord {
        id: Uuid::new_v4(),
        title: "Spring Produce Arrives".to_string(),
        content: "Asparagus and peas are back.\n\nCome taste the season.".to_string(),
        image: String::new(),
        created_at: now - Duration::days(3),
    };
    let older_post = BlogPostRecord {
        id: Uuid::new_v4(),
        title: "Meet Our Pastry Team".to_string(),
        content: "Croissants every morning.".to_string(),
        image: String::new(),
        created_at: now - Duration::days(10),
    };
    let feature = FeatureRecord {
        id: Uuid::new_v4(),
        title: "Open Kitchen".to_string(),
        description: "Watch every plate come together.".to_string(),
        image: String::new(),
    };

    let state = StoreState {
        menus: vec![dinner.clone(), lunch.clone()],
        categories: vec![mains.clone(), appetizers.clone()],
        tags: vec![vegetarian.clone(), spicy.clone()],
        dishes: vec![
            salad.clone(),
            chicken.clone(),
            steak.clone(),
            risotto.clone(),
        ],
        dish_tags: vec![(salad.id, vegetarian.id), (chicken.id, spicy.id)],
        items: vec![
            item(&appetizers, &salad, "Green Salad"),
            item(&mains, &chicken, "Chicken Delight"),
            item(&mains, &steak, "Tenderloin Steak"),
            risotto_item,
        ],
        features: vec![feature.clone()],
        chefs: vec![ChefRecord {
            id: Uuid::new_v4(),
            name: "Marco Rossi".to_string(),
            bio: "Twenty years at the pass.".to_string(),
            profile_image: String::new(),
            social: SocialLinks {
                twitter: Some("https://twitter.example/marco".to_string()),
                ..SocialLinks::default()
            },
        }],
        team_members: vec![TeamMemberRecord {
            id: Uuid::new_v4(),
            name: "Ana Silva".to_string(),
            role: "Sommelier".to_string(),
            profile_image: String::new(),
            social: SocialLinks::default(),
        }],
        testimonials: vec![TestimonialRecord {
            id: Uuid::new_v4(),
            client_name: "Jordan Lee".to_string(),
            profession: Some("Food critic".to_string()),
            content: "The best risotto in town.".to_string(),
            image: String::new(),
            created_at: now - Duration::days(5),
        }],
        blog_posts: vec![post.clone(), older_post],
        ..StoreState::default()
    };

    let fixture = Fixture {
        lunch,
        dinner,
        appetizers,
        mains,
        vegetarian,
        spicy,
        salad,
        chicken,
        steak,
        risotto,
        post,
        feature,
    };
    (state, fixture)
}

/// A menu with `count` single-item categories named `Category 00`, `Category 01`, ...
pub fn many_categories(count: usize) -> (StoreState, MenuRecord) {
    let menu = MenuRecord {
        id: Uuid::new_v4(),
        name: "Tasting Menu".to_string(),
        description: String::new(),
        created_at: OffsetDateTime::now_utc(),
    };
    let mut state = StoreState {
        menus: vec![menu.clone()],
        ..StoreState::default()
    };
    for index in 0..count {
        let category = CategoryRecord {
            id: Uuid::new_v4(),
            name: format!("Category {index:02}"),
        };
        let course = dish(&menu, &format!("Course {index:02}"), 500);
        state.items.push(item(&category, &course, &course.name));
        state.dishes.push(course);
        state.categories.push(category);
    }
    (state, menu)
}
