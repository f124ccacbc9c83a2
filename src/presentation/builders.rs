//! Conversions from service outputs to template views.

use reqwest::Url;
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};
use uuid::Uuid;

use crate::application::content::{
    AboutContent, BlogListing, BlogPostDetail, HomeContent, TeamContent,
};
use crate::application::menu::{DishDetail, MenuPage, TaggedDishes};
use crate::domain::entities::{
    BlogPostRecord, ChefRecord, CommentRecord, DishRecord, FeatureRecord, MenuRecord,
    SocialLinks, TeamMemberRecord, TestimonialRecord,
};
use crate::domain::validation::FieldError;

use super::views::{
    AboutView, BlogPostView, BlogView, CommentFormView, CommentView, DishCard, DishView,
    FeatureCard, FlashView, HomeView, MenuItemView, MenuLink, MenuSectionView, MenuView,
    PageLink, PaginationView, PersonCard, PostCard, SocialLinkView, TagLink, TagOption,
    TaggedDishesView, TeamView, TestimonialCard,
};

const DISPLAY_DATE: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const EXCERPT_CHARS: usize = 160;
const MENU_PATH: &str = "/menu/";

pub fn home_view(content: &HomeContent) -> HomeView {
    HomeView {
        features: content.features.iter().map(feature_card).collect(),
        testimonials: content.testimonials.iter().map(testimonial_card).collect(),
        team: content.team_members.iter().map(member_card).collect(),
        chefs: content.chefs.iter().map(chef_card).collect(),
        menus: content
            .menus
            .iter()
            .map(|menu| menu_link(menu, false))
            .collect(),
        posts: content.blog_posts.iter().map(post_card).collect(),
        categories: content
            .categories
            .iter()
            .map(|category| category.name.clone())
            .collect(),
    }
}

pub fn about_view(content: &AboutContent) -> AboutView {
    AboutView {
        chefs: content.chefs.iter().map(chef_card).collect(),
        features: content.features.iter().map(feature_card).collect(),
    }
}

pub fn team_view(content: &TeamContent) -> TeamView {
    TeamView {
        members: content.team_members.iter().map(member_card).collect(),
        chefs: content.chefs.iter().map(chef_card).collect(),
    }
}

pub fn blog_view(listing: &BlogListing) -> BlogView {
    BlogView {
        posts: listing.posts.iter().map(post_card).collect(),
        search: listing.search.clone().unwrap_or_default(),
        has_search: listing.search.is_some(),
    }
}

pub fn blog_post_view(
    detail: &BlogPostDetail,
    form: CommentFormView,
    flash: Option<FlashView>,
) -> BlogPostView {
    let post = &detail.post;
    BlogPostView {
        action: post_href(post.id),
        title: post.title.clone(),
        paragraphs: paragraphs(&post.content),
        image: post.image.clone(),
        published: display_date(post.created_at),
        iso_date: iso_date(post.created_at),
        comments: detail.comments.iter().map(comment_view).collect(),
        recent: detail
            .recent_posts
            .iter()
            .filter(|recent| recent.id != post.id)
            .map(post_card)
            .collect(),
        form,
        flash,
    }
}

/// Form values echoed back with the errors for each field.
pub fn comment_form_view(
    name: &str,
    email: &str,
    content: &str,
    errors: &[FieldError],
) -> CommentFormView {
    CommentFormView {
        name: name.to_string(),
        email: email.to_string(),
        content: content.to_string(),
        name_error: field_error(errors, "name"),
        email_error: field_error(errors, "email"),
        content_error: field_error(errors, "content"),
    }
}

pub fn field_error(errors: &[FieldError], field: &str) -> Option<String> {
    errors
        .iter()
        .find(|error| error.field == field)
        .map(|error| error.message.clone())
}

pub fn menu_view(page: &MenuPage) -> MenuView {
    let selected = &page.selected_menu;
    let search = page.search_query.clone().unwrap_or_default();
    let tag = page.tag_id.map(|id| id.to_string());

    let link = |number: u32| MenuLinkParams {
        menu: selected.id,
        search: page.search_query.as_deref(),
        tag: tag.as_deref(),
        page: Some(number),
    }
    .href();

    let pagination = PaginationView {
        pages: (1..=page.total_pages)
            .map(|number| PageLink {
                number,
                href: link(number),
                is_current: number == page.current_page,
            })
            .collect(),
        previous_href: page.has_previous.then(|| link(page.current_page - 1)),
        next_href: page.has_next.then(|| link(page.current_page + 1)),
        current_page: page.current_page,
        total_pages: page.total_pages,
    };

    let sections = page
        .sections
        .iter()
        .map(|section| MenuSectionView {
            anchor: format!("category-{}", section.category.id),
            name: section.category.name.clone(),
            is_active: page.active_category_id == Some(section.category.id),
            items: section
                .items
                .iter()
                .map(|entry| MenuItemView {
                    title: entry.item.title.clone(),
                    description: entry.item.description.clone(),
                    price: entry.item.price.to_string(),
                    image: entry.item.image.clone(),
                    available: entry.item.available,
                    dish_href: dish_href(entry.dish.id),
                })
                .collect(),
        })
        .collect();

    MenuView {
        menus: page
            .menus
            .iter()
            .map(|menu| menu_link(menu, menu.id == selected.id))
            .collect(),
        menu_id: selected.id.to_string(),
        menu_name: selected.name.clone(),
        menu_description: selected.description.clone(),
        tags: page
            .tags
            .iter()
            .map(|tag| TagOption {
                id: tag.id.to_string(),
                name: tag.name.clone(),
                is_selected: page.tag_id == Some(tag.id),
            })
            .collect(),
        has_filters: page.search_query.is_some() || page.tag_id.is_some(),
        search,
        sections,
        pagination,
    }
}

pub fn tagged_dishes_view(tagged: &TaggedDishes) -> TaggedDishesView {
    TaggedDishesView {
        tag_name: tagged.tag.name.clone(),
        dishes: tagged.dishes.iter().map(dish_card).collect(),
    }
}

pub fn dish_view(detail: &DishDetail) -> DishView {
    DishView {
        name: detail.dish.name.clone(),
        description: detail.dish.description.clone(),
        price: detail.dish.price.to_string(),
        image: detail.dish.image.clone(),
        menu_name: detail.menu.name.clone(),
        menu_href: MenuLinkParams::for_menu(detail.menu.id).href(),
        tags: detail
            .tags
            .iter()
            .map(|tag| TagLink {
                href: format!("/dishes/tag/{}/", tag.slug),
                name: tag.name.clone(),
            })
            .collect(),
    }
}

pub fn feature_card(feature: &FeatureRecord) -> FeatureCard {
    FeatureCard {
        href: format!("/feature/{}/", feature.id),
        title: feature.title.clone(),
        description: feature.description.clone(),
        image: feature.image.clone(),
    }
}

pub fn testimonial_card(testimonial: &TestimonialRecord) -> TestimonialCard {
    TestimonialCard {
        client_name: testimonial.client_name.clone(),
        profession: testimonial.profession.clone(),
        content: testimonial.content.clone(),
        image: testimonial.image.clone(),
    }
}

fn chef_card(chef: &ChefRecord) -> PersonCard {
    PersonCard {
        name: chef.name.clone(),
        subtitle: chef.bio.clone(),
        image: chef.profile_image.clone(),
        links: social_links(&chef.social),
    }
}

fn member_card(member: &TeamMemberRecord) -> PersonCard {
    PersonCard {
        name: member.name.clone(),
        subtitle: member.role.clone(),
        image: member.profile_image.clone(),
        links: social_links(&member.social),
    }
}

fn social_links(social: &SocialLinks) -> Vec<SocialLinkView> {
    [
        ("Twitter", &social.twitter),
        ("Facebook", &social.facebook),
        ("LinkedIn", &social.linkedin),
    ]
    .into_iter()
    .filter_map(|(label, href)| {
        href.as_ref().map(|href| SocialLinkView {
            label,
            href: href.clone(),
        })
    })
    .collect()
}

fn post_card(post: &BlogPostRecord) -> PostCard {
    PostCard {
        href: post_href(post.id),
        title: post.title.clone(),
        excerpt: excerpt(&post.content),
        image: post.image.clone(),
        published: display_date(post.created_at),
        iso_date: iso_date(post.created_at),
    }
}

fn comment_view(comment: &CommentRecord) -> CommentView {
    CommentView {
        name: comment.name.clone(),
        published: display_date(comment.created_at),
        content: comment.content.clone(),
    }
}

fn menu_link(menu: &MenuRecord, is_active: bool) -> MenuLink {
    MenuLink {
        href: MenuLinkParams::for_menu(menu.id).href(),
        name: menu.name.clone(),
        is_active,
    }
}

fn dish_card(dish: &DishRecord) -> DishCard {
    DishCard {
        href: dish_href(dish.id),
        name: dish.name.clone(),
        description: dish.description.clone(),
        price: dish.price.to_string(),
        image: dish.image.clone(),
    }
}

fn post_href(id: Uuid) -> String {
    format!("/blog/{id}/")
}

fn dish_href(id: Uuid) -> String {
    format!("/dish/{id}/")
}

/// Query parameters carried by links within the menu browser.
struct MenuLinkParams<'a> {
    menu: Uuid,
    search: Option<&'a str>,
    tag: Option<&'a str>,
    page: Option<u32>,
}

impl MenuLinkParams<'_> {
    fn for_menu(menu: Uuid) -> Self {
        Self {
            menu,
            search: None,
            tag: None,
            page: None,
        }
    }

    fn href(&self) -> String {
        let Ok(mut url) = Url::parse("http://localhost/menu/") else {
            return MENU_PATH.to_string();
        };
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("menu", &self.menu.to_string());
            if let Some(search) = self.search {
                pairs.append_pair("search", search);
            }
            if let Some(tag) = self.tag {
                pairs.append_pair("tag", tag);
            }
            if let Some(page) = self.page {
                pairs.append_pair("page", &page.to_string());
            }
        }
        match url.query() {
            Some(query) => format!("{MENU_PATH}?{query}"),
            None => MENU_PATH.to_string(),
        }
    }
}

fn display_date(value: OffsetDateTime) -> String {
    value.format(DISPLAY_DATE).unwrap_or_default()
}

fn iso_date(value: OffsetDateTime) -> String {
    value.format(ISO_DATE).unwrap_or_default()
}

fn excerpt(content: &str) -> String {
    let flattened = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= EXCERPT_CHARS {
        return flattened;
    }
    let cut: String = flattened.chars().take(EXCERPT_CHARS).collect();
    match cut.rfind(' ') {
        Some(space) => format!("{}…", &cut[..space]),
        None => format!("{cut}…"),
    }
}

fn paragraphs(content: &str) -> Vec<String> {
    content
        .split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn menu_links_encode_search_terms() {
        let menu = Uuid::nil();
        let href = MenuLinkParams {
            menu,
            search: Some("fish & chips"),
            tag: None,
            page: Some(2),
        }
        .href();
        assert_eq!(
            href,
            format!("/menu/?menu={menu}&search=fish+%26+chips&page=2")
        );
    }

    #[test]
    fn excerpt_cuts_on_word_boundary() {
        let long = "word ".repeat(60);
        let result = excerpt(&long);
        assert!(result.ends_with('…'));
        assert!(result.chars().count() <= EXCERPT_CHARS + 1);
        assert!(!result.contains("  "));
    }

    #[test]
    fn short_content_is_kept_whole() {
        assert_eq!(excerpt("Fresh  bread\ndaily"), "Fresh bread daily");
    }

    #[test]
    fn dates_render_for_humans_and_machines() {
        let at = datetime!(2026-03-05 18:30 UTC);
        assert_eq!(display_date(at), "March 5, 2026");
        assert_eq!(iso_date(at), "2026-03-05");
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        assert_eq!(
            paragraphs("First.\n\n\nSecond line\nstill second.\n\n"),
            vec!["First.".to_string(), "Second line\nstill second.".to_string()]
        );
    }

    #[test]
    fn field_errors_are_looked_up_by_name() {
        let errors = vec![FieldError {
            field: "email",
            message: "Please enter a valid email address".to_string(),
        }];
        let form = comment_form_view("Ana", "nope", "Lovely", &errors);
        assert_eq!(
            form.email_error.as_deref(),
            Some("Please enter a valid email address")
        );
        assert!(form.name_error.is_none());
        assert_eq!(form.email, "nope");
    }
}
