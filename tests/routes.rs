mod support;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use support::{ADMIN_ADDRESS, Fixture, MemoryStore, RecordingMailer, app, restaurant};
use tower::ServiceExt;

struct Harness {
    router: Router,
    store: Arc<MemoryStore>,
    mailer: Arc<RecordingMailer>,
    fixture: Fixture,
}

fn harness() -> Harness {
    let (state, fixture) = restaurant();
    let store = MemoryStore::new(state);
    let mailer = RecordingMailer::new();
    Harness {
        router: app(&store, &mailer),
        store,
        mailer,
        fixture,
    }
}

async fn get(router: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

async fn post_form(router: &Router, uri: &str, form: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .expect("request should build");
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be utf-8")
}

#[tokio::test]
async fn home_renders_reference_content() {
    let h = harness();
    let response = get(&h.router, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body = body_text(response).await;
    for expected in [
        "Open Kitchen",
        "Jordan Lee",
        "Ana Silva",
        "Marco Rossi",
        "Lunch Menu",
        "Spring Produce Arrives",
        "Appetizers",
    ] {
        assert!(body.contains(expected), "home page lacks {expected}");
    }
}

#[tokio::test]
async fn content_pages_render() {
    let h = harness();
    let feature = format!("/feature/{}/", h.fixture.feature.id);
    for uri in [
        "/about/",
        "/team/",
        "/testimonials/",
        "/features/",
        feature.as_str(),
        "/blog/",
        "/contact/",
        "/newsletter/",
    ] {
        let response = get(&h.router, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }

    let response = get(&h.router, "/feature/not-a-feature/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn menu_page_lists_first_menu_by_default() {
    let h = harness();
    let response = get(&h.router, "/menu/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Green Salad"));
    assert!(body.contains("Chicken Delight"));
    assert!(body.contains("9.50"));
    assert!(!body.contains("Truffle Risotto"));
}

#[tokio::test]
async fn menu_page_shows_unavailable_items() {
    let h = harness();
    let uri = format!("/menu/?menu={}", h.fixture.dinner.id);
    let body = body_text(get(&h.router, &uri).await).await;

    assert!(body.contains("Truffle Risotto"));
    assert!(body.contains("Currently unavailable"));
}

#[tokio::test]
async fn menu_page_applies_tag_filter() {
    let h = harness();
    let uri = format!("/menu/?tag={}", h.fixture.vegetarian.id);
    let body = body_text(get(&h.router, &uri).await).await;

    assert!(body.contains("Green Salad"));
    assert!(!body.contains("Chicken Delight"));
}

#[tokio::test]
async fn menu_page_escapes_search_input() {
    let h = harness();
    let body = body_text(get(&h.router, "/menu/?search=%3Cscript%3E").await).await;

    assert!(!body.contains("<script>"));
    assert!(body.contains("No dishes match your filters"));
}

#[tokio::test]
async fn unknown_menu_renders_not_found_page() {
    let h = harness();
    for uri in ["/menu/?menu=brunch", "/menu/?tag=vegan"] {
        let response = get(&h.router, uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        let body = body_text(response).await;
        assert!(body.contains("Page Not Found"));
    }
}

#[tokio::test]
async fn tag_and_dish_pages() {
    let h = harness();

    let body = body_text(get(&h.router, "/dishes/tag/spicy/").await).await;
    assert!(body.contains("Spicy Chicken"));
    assert!(!body.contains("Beef Steak"));

    let response = get(&h.router, "/dishes/tag/gluten-free/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let uri = format!("/dish/{}/", h.fixture.salad.id);
    let body = body_text(get(&h.router, &uri).await).await;
    assert!(body.contains("Vegetarian Salad"));
    assert!(body.contains("Lunch Menu"));
    assert!(body.contains("/dishes/tag/vegetarian/"));

    let response = get(&h.router, "/dish/salad/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_paths_fall_back_to_not_found() {
    let h = harness();
    let response = get(&h.router, "/reservations/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_text(response).await;
    assert!(body.contains("Page Not Found"));
    assert!(body.contains("/menu/"), "navigation is kept on 404 pages");
}

#[tokio::test]
async fn health_reflects_store_state() {
    let h = harness();
    let response = get(&h.router, "/_health/db").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    h.store.set_offline(true);
    let response = get(&h.router, "/_health/db").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn store_outage_renders_unavailable_page() {
    let h = harness();
    h.store.set_offline(true);

    for uri in ["/menu/", "/about/", "/blog/"] {
        let response = get(&h.router, uri).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        let body = body_text(response).await;
        assert!(body.contains("Service temporarily unavailable"));
    }
}

#[tokio::test]
async fn static_stylesheet_is_served() {
    let h = harness();
    let response = get(&h.router, "/static/site.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/css"
    );

    let response = get(&h.router, "/static/missing.css").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blog_post_shows_only_approved_comments() {
    let h = harness();
    let uri = format!("/blog/{}/", h.fixture.post.id);

    let response = post_form(
        &h.router,
        &uri,
        "name=Riley&email=riley%40example.com&content=Cannot+wait+for+the+asparagus",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers().get(header::LOCATION).unwrap();
    assert_eq!(location, &format!("{uri}?submitted=1"));

    let stored = h.store.snapshot().comments;
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].is_approved);

    let body = body_text(get(&h.router, &format!("{uri}?submitted=1")).await).await;
    assert!(body.contains("awaiting approval"));
    assert!(body.contains("Come taste the season."));
    assert!(!body.contains("Cannot wait for the asparagus"));

    h.store.update(|state| state.comments[0].is_approved = true);
    let body = body_text(get(&h.router, &uri).await).await;
    assert!(body.contains("Cannot wait for the asparagus"));
}

#[tokio::test]
async fn invalid_comment_keeps_input() {
    let h = harness();
    let uri = format!("/blog/{}/", h.fixture.post.id);

    let response = post_form(&h.router, &uri, "name=Riley&email=riley&content=").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Comment is required"));
    assert!(body.contains("Please enter a valid email address"));
    assert!(body.contains("value=\"Riley\""));
    assert!(h.store.snapshot().comments.is_empty());

    let response = post_form(
        &h.router,
        "/blog/not-a-post/",
        "name=Riley&email=riley%40example.com&content=Hi",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

const CONTACT_FORM: &str = "name=Jane+Doe&email=jane%40example.com&subject=Private+event\
                            &message=Do+you+host+parties+of+twenty%3F";

#[tokio::test]
async fn contact_submission_notifies_both_parties() {
    let h = harness();
    let response = post_form(&h.router, "/contact/", CONTACT_FORM).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Thank you for your message"));

    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, ADMIN_ADDRESS);
    assert_eq!(sent[0].subject, "New Contact Message: Private event");
    assert_eq!(sent[1].to, "jane@example.com");

    let messages = h.store.snapshot().contact_messages;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].notification_sent);
    assert!(!messages[0].is_read);
}

#[tokio::test]
async fn contact_mail_failure_keeps_the_message() {
    let h = harness();
    h.mailer.fail_for(ADMIN_ADDRESS);

    let response = post_form(&h.router, "/contact/", CONTACT_FORM).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("could not send the confirmation email"));

    let messages = h.store.snapshot().contact_messages;
    assert_eq!(messages.len(), 1);
    assert!(!messages[0].notification_sent);
}

#[tokio::test]
async fn invalid_contact_reports_each_field() {
    let h = harness();
    let response = post_form(
        &h.router,
        "/contact/",
        "name=J&email=&subject=Hey&message=Short",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    for expected in [
        "Name must be at least 2 characters long",
        "Email is required",
        "Subject must be at least 5 characters long",
        "Message must be at least 10 characters long",
        "value=\"Hey\"",
    ] {
        assert!(body.contains(expected), "missing {expected}");
    }
    assert!(h.store.snapshot().contact_messages.is_empty());
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn contact_store_failure_sends_nothing() {
    let h = harness();
    h.store.set_offline(true);

    let response = post_form(&h.router, "/contact/", CONTACT_FORM).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn newsletter_subscription_is_idempotent() {
    let h = harness();

    let response = post_form(&h.router, "/newsletter/", "email=Diner%40Example.com").await;
    let body = body_text(response).await;
    assert!(body.contains("Thank you for subscribing"));

    let response = post_form(&h.router, "/newsletter/", "email=diner%40example.com").await;
    let body = body_text(response).await;
    assert!(body.contains("already subscribed"));

    let subscribers = h.store.snapshot().subscribers;
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].email, "diner@example.com");

    let response = post_form(&h.router, "/newsletter/", "email=not-an-address").await;
    let body = body_text(response).await;
    assert!(body.contains("Please enter a valid email address"));
}
