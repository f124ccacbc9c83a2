use crate::application::error::{ErrorReport, HttpError};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let view = LayoutContext::new(chrome, ErrorPageView::not_found());
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

/// Standalone error page used where no request chrome is at hand.
pub fn render_error_page(status: StatusCode, message: &str) -> Result<String, AskamaError> {
    let view = LayoutContext::new(
        LayoutChrome::fallback(),
        ErrorPageView::for_status(status, message),
    );
    ErrorTemplate { view }.render()
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub tagline: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub canonical: String,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
}

impl LayoutChrome {
    /// Minimal chrome: brand and a link home.
    pub fn fallback() -> Self {
        Self {
            brand: BrandView {
                title: "Chefer".to_string(),
                tagline: String::new(),
                href: "/".to_string(),
            },
            navigation: NavigationView {
                entries: vec![NavigationLinkView {
                    label: "Home".to_string(),
                    href: "/".to_string(),
                    is_active: false,
                }],
            },
            footer: FooterView {
                copy: String::new(),
            },
            meta: PageMetaView {
                title: "Chefer".to_string(),
                description: String::new(),
                canonical: String::new(),
            },
        }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            content,
        }
    }
}

// Shared cards

#[derive(Clone)]
pub struct FeatureCard {
    pub href: String,
    pub title: String,
    pub description: String,
    pub image: String,
}

#[derive(Clone)]
pub struct SocialLinkView {
    pub label: &'static str,
    pub href: String,
}

/// A chef or team member.
#[derive(Clone)]
pub struct PersonCard {
    pub name: String,
    pub subtitle: String,
    pub image: String,
    pub links: Vec<SocialLinkView>,
}

#[derive(Clone)]
pub struct TestimonialCard {
    pub client_name: String,
    pub profession: Option<String>,
    pub content: String,
    pub image: String,
}

#[derive(Clone)]
pub struct PostCard {
    pub href: String,
    pub title: String,
    pub excerpt: String,
    pub image: String,
    pub published: String,
    pub iso_date: String,
}

#[derive(Clone)]
pub struct MenuLink {
    pub href: String,
    pub name: String,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct DishCard {
    pub href: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: String,
}

#[derive(Clone)]
pub struct TagLink {
    pub href: String,
    pub name: String,
}

/// Outcome banner shown above a form.
#[derive(Clone)]
pub struct FlashView {
    pub kind: &'static str,
    pub message: String,
}

impl FlashView {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: "success",
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: "info",
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: "warning",
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: "error",
            message: message.into(),
        }
    }
}

// Home and static sections

pub struct HomeView {
    pub features: Vec<FeatureCard>,
    pub testimonials: Vec<TestimonialCard>,
    pub team: Vec<PersonCard>,
    pub chefs: Vec<PersonCard>,
    pub menus: Vec<MenuLink>,
    pub posts: Vec<PostCard>,
    pub categories: Vec<String>,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub view: LayoutContext<HomeView>,
}

pub struct AboutView {
    pub chefs: Vec<PersonCard>,
    pub features: Vec<FeatureCard>,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub view: LayoutContext<AboutView>,
}

pub struct TeamView {
    pub members: Vec<PersonCard>,
    pub chefs: Vec<PersonCard>,
}

#[derive(Template)]
#[template(path = "team.html")]
pub struct TeamTemplate {
    pub view: LayoutContext<TeamView>,
}

pub struct TestimonialsView {
    pub testimonials: Vec<TestimonialCard>,
}

#[derive(Template)]
#[template(path = "testimonials.html")]
pub struct TestimonialsTemplate {
    pub view: LayoutContext<TestimonialsView>,
}

pub struct FeaturesView {
    pub features: Vec<FeatureCard>,
}

#[derive(Template)]
#[template(path = "features.html")]
pub struct FeaturesTemplate {
    pub view: LayoutContext<FeaturesView>,
}

#[derive(Template)]
#[template(path = "feature.html")]
pub struct FeatureTemplate {
    pub view: LayoutContext<FeatureCard>,
}

// Blog

pub struct BlogView {
    pub posts: Vec<PostCard>,
    pub search: String,
    pub has_search: bool,
}

#[derive(Template)]
#[template(path = "blog.html")]
pub struct BlogTemplate {
    pub view: LayoutContext<BlogView>,
}

pub struct CommentView {
    pub name: String,
    pub published: String,
    pub content: String,
}

/// Comment form values and per-field errors.
#[derive(Default)]
pub struct CommentFormView {
    pub name: String,
    pub email: String,
    pub content: String,
    pub name_error: Option<String>,
    pub email_error: Option<String>,
    pub content_error: Option<String>,
}

pub struct BlogPostView {
    pub action: String,
    pub title: String,
    pub paragraphs: Vec<String>,
    pub image: String,
    pub published: String,
    pub iso_date: String,
    pub comments: Vec<CommentView>,
    pub recent: Vec<PostCard>,
    pub form: CommentFormView,
    pub flash: Option<FlashView>,
}

#[derive(Template)]
#[template(path = "blog_post.html")]
pub struct BlogPostTemplate {
    pub view: LayoutContext<BlogPostView>,
}

// Intake forms

#[derive(Default)]
pub struct ContactView {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub name_error: Option<String>,
    pub email_error: Option<String>,
    pub subject_error: Option<String>,
    pub message_error: Option<String>,
    pub flash: Option<FlashView>,
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub view: LayoutContext<ContactView>,
}

#[derive(Default)]
pub struct NewsletterView {
    pub email: String,
    pub email_error: Option<String>,
    pub flash: Option<FlashView>,
}

#[derive(Template)]
#[template(path = "newsletter.html")]
pub struct NewsletterTemplate {
    pub view: LayoutContext<NewsletterView>,
}

// Menu

pub struct TagOption {
    pub id: String,
    pub name: String,
    pub is_selected: bool,
}

pub struct MenuItemView {
    pub title: String,
    pub description: String,
    pub price: String,
    pub image: String,
    pub available: bool,
    pub dish_href: String,
}

pub struct MenuSectionView {
    pub anchor: String,
    pub name: String,
    pub is_active: bool,
    pub items: Vec<MenuItemView>,
}

pub struct PageLink {
    pub number: u32,
    pub href: String,
    pub is_current: bool,
}

pub struct PaginationView {
    pub pages: Vec<PageLink>,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
    pub current_page: u32,
    pub total_pages: u32,
}

impl PaginationView {
    pub fn is_visible(&self) -> bool {
        self.total_pages > 1
    }
}

pub struct MenuView {
    pub menus: Vec<MenuLink>,
    pub menu_id: String,
    pub menu_name: String,
    pub menu_description: String,
    pub tags: Vec<TagOption>,
    pub search: String,
    pub has_filters: bool,
    pub sections: Vec<MenuSectionView>,
    pub pagination: PaginationView,
}

#[derive(Template)]
#[template(path = "menu.html")]
pub struct MenuTemplate {
    pub view: LayoutContext<MenuView>,
}

pub struct TaggedDishesView {
    pub tag_name: String,
    pub dishes: Vec<DishCard>,
}

#[derive(Template)]
#[template(path = "dishes_by_tag.html")]
pub struct TaggedDishesTemplate {
    pub view: LayoutContext<TaggedDishesView>,
}

pub struct DishView {
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: String,
    pub menu_name: String,
    pub menu_href: String,
    pub tags: Vec<TagLink>,
}

#[derive(Template)]
#[template(path = "dish.html")]
pub struct DishTemplate {
    pub view: LayoutContext<DishView>,
}

// Errors

pub struct ErrorPageView {
    pub status: u16,
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND.as_u16(),
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Our menu is a good place to start."
                .to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }

    pub fn for_status(status: StatusCode, message: &str) -> Self {
        if status == StatusCode::NOT_FOUND {
            return Self::not_found();
        }
        Self {
            status: status.as_u16(),
            title: status
                .canonical_reason()
                .unwrap_or("Something went wrong")
                .to_string(),
            message: message.to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}
