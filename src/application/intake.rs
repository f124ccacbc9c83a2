//! Contact messages, newsletter subscriptions, blog comments and newsletter
//! broadcasts.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::application::mail::{MailMessage, Mailer};
use crate::application::repos::{
    ContentRepo, CreateCommentParams, CreateContactMessageParams, IntakeRepo, RepoError,
};
use crate::domain::entities::{CommentRecord, ContactMessageRecord};
use crate::domain::validation::{
    ContactInput, FieldError, SUBJECT_MAX_CHARS, Validation, validate_comment, validate_contact,
    validate_newsletter,
};

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("blog post `{0}` not found")]
    UnknownPost(String),
    #[error("invalid broadcast: {0}")]
    InvalidBroadcast(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Raw form fields as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub name: String,
    pub email: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub enum ContactOutcome {
    Rejected(Vec<FieldError>),
    /// Stored and both notifications went out.
    Delivered(ContactMessageRecord),
    /// Stored, but at least one notification failed.
    StoredWithoutNotification(ContactMessageRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsletterOutcome {
    Rejected(Vec<FieldError>),
    Subscribed(String),
    AlreadySubscribed(String),
}

#[derive(Debug, Clone)]
pub enum CommentOutcome {
    Rejected(Vec<FieldError>),
    AwaitingApproval(CommentRecord),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent: usize,
    pub failures: Vec<(String, String)>,
}

/// Addresses and sign-off used in outgoing notifications.
#[derive(Debug, Clone)]
pub struct NotificationSettings {
    pub admin_address: String,
    pub signature: String,
}

#[derive(Clone)]
pub struct IntakeService {
    intake: Arc<dyn IntakeRepo>,
    content: Arc<dyn ContentRepo>,
    mailer: Arc<dyn Mailer>,
    notifications: NotificationSettings,
}

impl IntakeService {
    pub fn new(
        intake: Arc<dyn IntakeRepo>,
        content: Arc<dyn ContentRepo>,
        mailer: Arc<dyn Mailer>,
        notifications: NotificationSettings,
    ) -> Self {
        Self {
            intake,
            content,
            mailer,
            notifications,
        }
    }

    #[instrument(skip_all)]
    pub async fn submit_contact(&self, form: ContactForm) -> Result<ContactOutcome, IntakeError> {
        let input = match validate_contact(&form.name, &form.email, &form.subject, &form.message)
        {
            Validation::Valid(input) => input,
            Validation::Invalid(errors) => return Ok(ContactOutcome::Rejected(errors)),
        };

        let record = self
            .intake
            .create_contact_message(CreateContactMessageParams {
                name: input.name.clone(),
                email: input.email.clone(),
                subject: input.subject.clone(),
                message: input.message.clone(),
            })
            .await?;
        info!(message_id = %record.id, "contact message stored");

        let admin = self.admin_notification(&input);
        if let Err(err) = self.mailer.send(&admin).await {
            error!(message_id = %record.id, error = %err, "admin notification failed");
            return Ok(ContactOutcome::StoredWithoutNotification(record));
        }

        let confirmation = self.submitter_confirmation(&input);
        if let Err(err) = self.mailer.send(&confirmation).await {
            error!(message_id = %record.id, error = %err, "submitter confirmation failed");
            return Ok(ContactOutcome::StoredWithoutNotification(record));
        }

        let mut record = record;
        match self.intake.mark_notification_sent(record.id).await {
            Ok(()) => record.notification_sent = true,
            Err(err) => {
                warn!(message_id = %record.id, error = %err, "failed to flag notification as sent");
            }
        }
        Ok(ContactOutcome::Delivered(record))
    }

    #[instrument(skip_all)]
    pub async fn subscribe(&self, email: &str) -> Result<NewsletterOutcome, IntakeError> {
        let email = match validate_newsletter(email) {
            Validation::Valid(email) => email,
            Validation::Invalid(errors) => return Ok(NewsletterOutcome::Rejected(errors)),
        };

        let outcome = self.intake.subscribe(&email).await?;
        if outcome.created {
            info!(subscriber_id = %outcome.subscriber.id, "newsletter subscriber added");
            Ok(NewsletterOutcome::Subscribed(outcome.subscriber.email))
        } else {
            Ok(NewsletterOutcome::AlreadySubscribed(outcome.subscriber.email))
        }
    }

    #[instrument(skip(self, form))]
    pub async fn submit_comment(
        &self,
        raw_post_id: &str,
        form: CommentForm,
    ) -> Result<CommentOutcome, IntakeError> {
        let unknown = || IntakeError::UnknownPost(raw_post_id.to_string());
        let post_id = Uuid::parse_str(raw_post_id.trim()).map_err(|_| unknown())?;
        let post = self
            .content
            .find_blog_post(post_id)
            .await?
            .ok_or_else(unknown)?;

        let input = match validate_comment(&form.name, &form.email, &form.content) {
            Validation::Valid(input) => input,
            Validation::Invalid(errors) => return Ok(CommentOutcome::Rejected(errors)),
        };

        let comment = self
            .intake
            .create_comment(CreateCommentParams {
                post_id: post.id,
                name: input.name,
                email: input.email,
                content: input.content,
            })
            .await?;
        info!(comment_id = %comment.id, post_id = %post.id, "comment awaiting approval");
        Ok(CommentOutcome::AwaitingApproval(comment))
    }

    /// Send one message per subscriber. Failures are collected, not retried.
    #[instrument(skip(self, body))]
    pub async fn broadcast(&self, subject: &str, body: &str) -> Result<BroadcastReport, IntakeError> {
        let subject = subject.trim();
        let body = body.trim();
        if subject.is_empty() || subject.chars().count() > SUBJECT_MAX_CHARS {
            return Err(IntakeError::InvalidBroadcast(format!(
                "subject must be 1 to {SUBJECT_MAX_CHARS} characters"
            )));
        }
        if body.is_empty() {
            return Err(IntakeError::InvalidBroadcast(
                "message body is empty".to_string(),
            ));
        }

        let subscribers = self.intake.list_subscribers().await?;
        let mut report = BroadcastReport::default();
        for subscriber in subscribers {
            let message = MailMessage {
                to: subscriber.email.clone(),
                subject: subject.to_string(),
                body: body.to_string(),
            };
            match self.mailer.send(&message).await {
                Ok(()) => report.sent += 1,
                Err(err) => {
                    warn!(subscriber_id = %subscriber.id, error = %err, "newsletter delivery failed");
                    report.failures.push((subscriber.email, err.to_string()));
                }
            }
        }

        info!(
            sent = report.sent,
            failed = report.failures.len(),
            "newsletter broadcast finished"
        );
        Ok(report)
    }

    fn admin_notification(&self, input: &ContactInput) -> MailMessage {
        MailMessage {
            to: self.notifications.admin_address.clone(),
            subject: format!("New Contact Message: {}", input.subject),
            body: format!(
                "New message from website contact form:\n\n\
                 Name: {}\nEmail: {}\nSubject: {}\n\nMessage:\n{}\n",
                input.name, input.email, input.subject, input.message
            ),
        }
    }

    fn submitter_confirmation(&self, input: &ContactInput) -> MailMessage {
        MailMessage {
            to: input.email.clone(),
            subject: "Thank you for contacting us".to_string(),
            body: format!(
                "Dear {},\n\n\
                 Thank you for contacting us. We have received your message and will get back \
                 to you soon.\n\nYour message:\n{}\n\nBest regards,\n{}\n",
                input.name, input.message, self.notifications.signature
            ),
        }
    }
}
