use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;

use crate::{
    application::menu::MenuQuery,
    presentation::{
        builders::{dish_view, menu_view, tagged_dishes_view},
        views::{
            DishTemplate, LayoutContext, MenuTemplate, TaggedDishesTemplate,
            render_template_response,
        },
    },
};

use super::{HttpState, failure_response};

const MENU_PATH: &str = "/menu/";

/// `/menu/` query string. Every value stays raw; the service decides what a
/// malformed value means.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct MenuParams {
    menu: Option<String>,
    search: Option<String>,
    tag: Option<String>,
    category: Option<String>,
    page: Option<String>,
}

impl From<MenuParams> for MenuQuery {
    fn from(params: MenuParams) -> Self {
        Self {
            menu: params.menu,
            search: params.search,
            tag: params.tag,
            category: params.category,
            page: params.page,
        }
    }
}

pub(super) async fn menu_page(
    State(state): State<HttpState>,
    Query(params): Query<MenuParams>,
) -> Response {
    match state.menu.menu_page(params.into()).await {
        Ok(page) => {
            let chrome = state.chrome.load(MENU_PATH, &page.selected_menu.name);
            let view = LayoutContext::new(chrome, menu_view(&page));
            render_template_response(MenuTemplate { view }, StatusCode::OK)
        }
        Err(err) => failure_response(state.chrome.load(MENU_PATH, "Menu"), err),
    }
}

pub(super) async fn dishes_by_tag(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
) -> Response {
    let path = format!("/dishes/tag/{slug}/");
    match state.menu.dishes_by_tag(&slug).await {
        Ok(tagged) => {
            let title = format!("{} dishes", tagged.tag.name);
            let chrome = state.chrome.load(&path, &title);
            let view = LayoutContext::new(chrome, tagged_dishes_view(&tagged));
            render_template_response(TaggedDishesTemplate { view }, StatusCode::OK)
        }
        Err(err) => failure_response(state.chrome.load(&path, "Page not found"), err),
    }
}

pub(super) async fn dish_detail(
    State(state): State<HttpState>,
    Path(id): Path<String>,
) -> Response {
    let path = format!("/dish/{id}/");
    match state.menu.dish_detail(&id).await {
        Ok(detail) => {
            let chrome = state.chrome.load(&path, &detail.dish.name);
            let view = LayoutContext::new(chrome, dish_view(&detail));
            render_template_response(DishTemplate { view }, StatusCode::OK)
        }
        Err(err) => failure_response(state.chrome.load(&path, "Page not found"), err),
    }
}
