use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    middleware,
    response::Response,
    routing::get,
};
use serde::Deserialize;

use crate::{
    application::{
        chrome::ChromeService, content::ContentService, intake::IntakeService,
        menu::MenuQueryService, repos::StoreHealth,
    },
    infra::assets::serve_static,
    presentation::{
        builders::{
            about_view, blog_post_view, blog_view, feature_card, home_view, team_view,
            testimonial_card,
        },
        views::{
            AboutTemplate, BlogPostTemplate, BlogTemplate, CommentFormView, FeatureTemplate,
            FeaturesTemplate, FeaturesView, FlashView, HomeTemplate, LayoutContext, TeamTemplate,
            TestimonialsTemplate, TestimonialsView, render_not_found_response,
            render_template_response,
        },
    },
};

use super::{
    db_health_response, failure_response, forms, menu,
    middleware::{log_responses, set_request_context},
};

const COMMENT_PENDING_MESSAGE: &str =
    "Thank you! Your comment has been submitted and is awaiting approval.";

#[derive(Clone)]
pub struct HttpState {
    pub menu: Arc<MenuQueryService>,
    pub content: Arc<ContentService>,
    pub intake: Arc<IntakeService>,
    pub chrome: Arc<ChromeService>,
    pub health: Arc<dyn StoreHealth>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/about/", get(about))
        .route("/team/", get(team))
        .route("/testimonials/", get(testimonials))
        .route("/features/", get(features))
        .route("/feature/{id}/", get(feature_detail))
        .route("/blog/", get(blog))
        .route("/blog/{id}/", get(blog_post).post(forms::submit_comment))
        .route(
            "/contact/",
            get(forms::contact_page).post(forms::submit_contact),
        )
        .route(
            "/newsletter/",
            get(forms::newsletter_page).post(forms::subscribe),
        )
        .route("/menu/", get(menu::menu_page))
        .route("/dishes/tag/{slug}/", get(menu::dishes_by_tag))
        .route("/dish/{id}/", get(menu::dish_detail))
        .route("/_health/db", get(public_health))
        .route("/static/{*path}", get(serve_static))
        .fallback(fallback_router)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchQuery {
    search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SubmittedQuery {
    submitted: Option<String>,
}

async fn home(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.load("/", "");
    match state.content.home().await {
        Ok(content) => {
            let view = LayoutContext::new(chrome, home_view(&content));
            render_template_response(HomeTemplate { view }, StatusCode::OK)
        }
        Err(err) => failure_response(chrome, err),
    }
}

async fn about(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.load("/about/", "About");
    match state.content.about().await {
        Ok(content) => {
            let view = LayoutContext::new(chrome, about_view(&content));
            render_template_response(AboutTemplate { view }, StatusCode::OK)
        }
        Err(err) => failure_response(chrome, err),
    }
}

async fn team(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.load("/team/", "Our Team");
    match state.content.team().await {
        Ok(content) => {
            let view = LayoutContext::new(chrome, team_view(&content));
            render_template_response(TeamTemplate { view }, StatusCode::OK)
        }
        Err(err) => failure_response(chrome, err),
    }
}

async fn testimonials(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.load("/testimonials/", "Testimonials");
    match state.content.testimonial_list().await {
        Ok(list) => {
            let content = TestimonialsView {
                testimonials: list.iter().map(testimonial_card).collect(),
            };
            let view = LayoutContext::new(chrome, content);
            render_template_response(TestimonialsTemplate { view }, StatusCode::OK)
        }
        Err(err) => failure_response(chrome, err),
    }
}

async fn features(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.load("/features/", "Features");
    match state.content.feature_list().await {
        Ok(list) => {
            let content = FeaturesView {
                features: list.iter().map(feature_card).collect(),
            };
            let view = LayoutContext::new(chrome, content);
            render_template_response(FeaturesTemplate { view }, StatusCode::OK)
        }
        Err(err) => failure_response(chrome, err),
    }
}

async fn feature_detail(State(state): State<HttpState>, Path(id): Path<String>) -> Response {
    let path = format!("/feature/{id}/");
    match state.content.feature(&id).await {
        Ok(feature) => {
            let chrome = state.chrome.load(&path, &feature.title);
            let view = LayoutContext::new(chrome, feature_card(&feature));
            render_template_response(FeatureTemplate { view }, StatusCode::OK)
        }
        Err(err) => failure_response(state.chrome.load(&path, "Page not found"), err),
    }
}

async fn blog(State(state): State<HttpState>, Query(query): Query<SearchQuery>) -> Response {
    let chrome = state.chrome.load("/blog/", "Blog");
    match state.content.blog(query.search.as_deref()).await {
        Ok(listing) => {
            let view = LayoutContext::new(chrome, blog_view(&listing));
            render_template_response(BlogTemplate { view }, StatusCode::OK)
        }
        Err(err) => failure_response(chrome, err),
    }
}

async fn blog_post(
    State(state): State<HttpState>,
    Path(id): Path<String>,
    Query(query): Query<SubmittedQuery>,
) -> Response {
    let path = format!("/blog/{id}/");
    match state.content.blog_post(&id).await {
        Ok(detail) => {
            let flash = query
                .submitted
                .is_some()
                .then(|| FlashView::success(COMMENT_PENDING_MESSAGE));
            let chrome = state.chrome.load(&path, &detail.post.title);
            let content = blog_post_view(&detail, CommentFormView::default(), flash);
            let view = LayoutContext::new(chrome, content);
            render_template_response(BlogPostTemplate { view }, StatusCode::OK)
        }
        Err(err) => failure_response(state.chrome.load(&path, "Page not found"), err),
    }
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.health.ping().await)
}

async fn fallback_router(State(state): State<HttpState>, request: Request<Body>) -> Response {
    let chrome = state.chrome.load(request.uri().path(), "Page not found");
    render_not_found_response(chrome)
}
