//! Contact, newsletter and comment submissions.

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::warn;

use crate::{
    application::intake::{
        CommentForm, CommentOutcome, ContactForm, ContactOutcome, NewsletterOutcome,
    },
    domain::validation::FieldError,
    presentation::{
        builders::{blog_post_view, comment_form_view, field_error},
        views::{
            BlogPostTemplate, ContactTemplate, ContactView, FlashView, LayoutContext,
            NewsletterTemplate, NewsletterView, render_template_response,
        },
    },
};

use super::{HttpState, failure_response};

const CONTACT_PATH: &str = "/contact/";
const NEWSLETTER_PATH: &str = "/newsletter/";

const CONTACT_DELIVERED_MESSAGE: &str =
    "Thank you for your message! We will get back to you soon.";
const CONTACT_PARTIAL_MESSAGE: &str = "Your message was received, but we could not send the \
     confirmation email. We will still get back to you.";
const SUBSCRIBED_MESSAGE: &str = "Thank you for subscribing to our newsletter!";
const ALREADY_SUBSCRIBED_MESSAGE: &str = "You are already subscribed to our newsletter.";
const FORM_ERRORS_MESSAGE: &str = "Please correct the errors below.";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct NewsletterForm {
    email: String,
}

pub(super) async fn contact_page(State(state): State<HttpState>) -> Response {
    render_contact(&state, ContactView::default())
}

pub(super) async fn submit_contact(
    State(state): State<HttpState>,
    Form(form): Form<ContactForm>,
) -> Response {
    let chrome = state.chrome.load(CONTACT_PATH, "Contact");
    match state.intake.submit_contact(form.clone()).await {
        Ok(ContactOutcome::Rejected(errors)) => {
            render_contact(&state, contact_errors(form, &errors))
        }
        Ok(ContactOutcome::Delivered(_)) => render_contact(
            &state,
            ContactView {
                flash: Some(FlashView::success(CONTACT_DELIVERED_MESSAGE)),
                ..ContactView::default()
            },
        ),
        Ok(ContactOutcome::StoredWithoutNotification(record)) => {
            warn!(message_id = %record.id, "contact message stored without notification");
            render_contact(
                &state,
                ContactView {
                    flash: Some(FlashView::warning(CONTACT_PARTIAL_MESSAGE)),
                    ..ContactView::default()
                },
            )
        }
        Err(err) => failure_response(chrome, err),
    }
}

fn contact_errors(form: ContactForm, errors: &[FieldError]) -> ContactView {
    ContactView {
        name_error: field_error(errors, "name"),
        email_error: field_error(errors, "email"),
        subject_error: field_error(errors, "subject"),
        message_error: field_error(errors, "message"),
        name: form.name,
        email: form.email,
        subject: form.subject,
        message: form.message,
        flash: Some(FlashView::error(FORM_ERRORS_MESSAGE)),
    }
}

fn render_contact(state: &HttpState, content: ContactView) -> Response {
    let chrome = state.chrome.load(CONTACT_PATH, "Contact");
    let view = LayoutContext::new(chrome, content);
    render_template_response(ContactTemplate { view }, StatusCode::OK)
}

pub(super) async fn newsletter_page(State(state): State<HttpState>) -> Response {
    render_newsletter(&state, NewsletterView::default())
}

pub(super) async fn subscribe(
    State(state): State<HttpState>,
    Form(form): Form<NewsletterForm>,
) -> Response {
    match state.intake.subscribe(&form.email).await {
        Ok(NewsletterOutcome::Rejected(errors)) => render_newsletter(
            &state,
            NewsletterView {
                email_error: field_error(&errors, "email"),
                email: form.email,
                flash: Some(FlashView::error(FORM_ERRORS_MESSAGE)),
            },
        ),
        Ok(NewsletterOutcome::Subscribed(_)) => render_newsletter(
            &state,
            NewsletterView {
                flash: Some(FlashView::success(SUBSCRIBED_MESSAGE)),
                ..NewsletterView::default()
            },
        ),
        Ok(NewsletterOutcome::AlreadySubscribed(_)) => render_newsletter(
            &state,
            NewsletterView {
                flash: Some(FlashView::info(ALREADY_SUBSCRIBED_MESSAGE)),
                ..NewsletterView::default()
            },
        ),
        Err(err) => failure_response(state.chrome.load(NEWSLETTER_PATH, "Newsletter"), err),
    }
}

fn render_newsletter(state: &HttpState, content: NewsletterView) -> Response {
    let chrome = state.chrome.load(NEWSLETTER_PATH, "Newsletter");
    let view = LayoutContext::new(chrome, content);
    render_template_response(NewsletterTemplate { view }, StatusCode::OK)
}

/// Accepted comments redirect back to the post; rejected ones re-render it
/// with the submitted values.
pub(super) async fn submit_comment(
    State(state): State<HttpState>,
    Path(id): Path<String>,
    Form(form): Form<CommentForm>,
) -> Response {
    let path = format!("/blog/{id}/");
    let not_found_chrome = || state.chrome.load(&path, "Page not found");

    let errors = match state.intake.submit_comment(&id, form.clone()).await {
        Ok(CommentOutcome::AwaitingApproval(comment)) => {
            return Redirect::to(&format!("/blog/{}/?submitted=1", comment.post_id))
                .into_response();
        }
        Ok(CommentOutcome::Rejected(errors)) => errors,
        Err(err) => return failure_response(not_found_chrome(), err),
    };

    match state.content.blog_post(&id).await {
        Ok(detail) => {
            let chrome = state.chrome.load(&path, &detail.post.title);
            let comment_form = comment_form_view(&form.name, &form.email, &form.content, &errors);
            let content = blog_post_view(
                &detail,
                comment_form,
                Some(FlashView::error(FORM_ERRORS_MESSAGE)),
            );
            let view = LayoutContext::new(chrome, content);
            render_template_response(BlogPostTemplate { view }, StatusCode::OK)
        }
        Err(err) => failure_response(not_found_chrome(), err),
    }
}
