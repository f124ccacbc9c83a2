//! Postgres-backed repository implementations.

mod catalog;
mod content;
mod import;
mod intake;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{
    Postgres, QueryBuilder, Transaction,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::{ContentFilter, RepoError, StoreHealth};
use crate::domain::price::Price;
use crate::infra::error::InfraError;

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<Transaction<'_, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, InfraError> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(InfraError::database)
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), InfraError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        Ok(())
    }

    /// Append a literal, case-insensitive substring match on `column`.
    ///
    /// `position` is used instead of `ILIKE` so `%` and `_` in user input
    /// are matched as themselves.
    fn apply_search<'q>(
        qb: &mut QueryBuilder<'q, Postgres>,
        column: &'static str,
        filter: &'q ContentFilter,
    ) {
        if let Some(search) = filter.search.as_ref() {
            qb.push(" AND position(lower(");
            qb.push_bind(search);
            qb.push(") in lower(");
            qb.push(column);
            qb.push(")) > 0");
        }
    }

    fn apply_limit(qb: &mut QueryBuilder<'_, Postgres>, limit: Option<u32>) {
        if let Some(limit) = limit {
            qb.push(" LIMIT ");
            qb.push_bind(i64::from(limit));
        }
    }
}

#[async_trait]
impl StoreHealth for PostgresRepositories {
    async fn ping(&self) -> Result<(), RepoError> {
        query("SELECT 1")
            .execute(self.pool())
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }
}

/// Convert a stored minor-unit amount, rejecting rows outside the price range.
fn price_from_column(minor_units: i64) -> Result<Price, RepoError> {
    Price::from_minor_units(minor_units).map_err(|err| RepoError::Integrity {
        message: format!("stored price {minor_units} is invalid: {err}"),
    })
}
