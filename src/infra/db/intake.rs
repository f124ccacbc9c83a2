use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{
        CreateCommentParams, CreateContactMessageParams, IntakeRepo, RepoError, SubscribeOutcome,
    },
    domain::entities::{CommentRecord, ContactMessageRecord, NewsletterSubscriberRecord},
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct ContactMessageRow {
    id: Uuid,
    name: String,
    email: String,
    subject: String,
    message: String,
    is_read: bool,
    notification_sent: bool,
    created_at: OffsetDateTime,
}

impl From<ContactMessageRow> for ContactMessageRecord {
    fn from(row: ContactMessageRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            subject: row.subject,
            message: row.message,
            is_read: row.is_read,
            notification_sent: row.notification_sent,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SubscriberRow {
    id: Uuid,
    email: String,
    created_at: OffsetDateTime,
}

impl From<SubscriberRow> for NewsletterSubscriberRecord {
    fn from(row: SubscriberRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    name: String,
    email: String,
    content: String,
    is_approved: bool,
    created_at: OffsetDateTime,
}

#[async_trait]
impl IntakeRepo for PostgresRepositories {
    async fn create_contact_message(
        &self,
        params: CreateContactMessageParams,
    ) -> Result<ContactMessageRecord, RepoError> {
        let row = sqlx::query_as::<_, ContactMessageRow>(
            r#"
            INSERT INTO contact_messages (id, name, email, subject, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, subject, message, is_read, notification_sent, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(params.name)
        .bind(params.email)
        .bind(params.subject)
        .bind(params.message)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn mark_notification_sent(&self, id: Uuid) -> Result<(), RepoError> {
        let result =
            sqlx::query("UPDATE contact_messages SET notification_sent = TRUE WHERE id = $1")
                .bind(id)
                .execute(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn subscribe(&self, email: &str) -> Result<SubscribeOutcome, RepoError> {
        let inserted = sqlx::query_as::<_, SubscriberRow>(
            r#"
            INSERT INTO newsletter_subscribers (id, email)
            VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if let Some(row) = inserted {
            return Ok(SubscribeOutcome {
                subscriber: row.into(),
                created: true,
            });
        }

        let existing = sqlx::query_as::<_, SubscriberRow>(
            "SELECT id, email, created_at FROM newsletter_subscribers WHERE email = $1",
        )
        .bind(email)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(SubscribeOutcome {
            subscriber: existing.into(),
            created: false,
        })
    }

    async fn list_subscribers(&self) -> Result<Vec<NewsletterSubscriberRecord>, RepoError> {
        let rows = sqlx::query_as::<_, SubscriberRow>(
            r#"
            SELECT id, email, created_at
            FROM newsletter_subscribers
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(NewsletterSubscriberRecord::from).collect())
    }

    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (id, post_id, name, email, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, post_id, name, email, content, is_approved, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(params.post_id)
        .bind(params.name)
        .bind(params.email)
        .bind(params.content)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(CommentRecord {
            id: row.id,
            post_id: row.post_id,
            name: row.name,
            email: row.email,
            content: row.content,
            is_approved: row.is_approved,
            created_at: row.created_at,
        })
    }
}
