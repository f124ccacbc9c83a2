use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::{
        content::ContentError, import::ImportError, intake::IntakeError, menu::MenuQueryError,
        repos::RepoError,
    },
    cache::CacheError,
    infra::error::InfraError,
    presentation::views::render_error_page,
};

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// An error on its way to the client: a status, a public message shown on
/// the error page and a diagnostic report for the response log.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        let report = ErrorReport::from_message(source, status, detail);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn not_found(source: &'static str, detail: impl Into<String>) -> Self {
        Self::new(source, StatusCode::NOT_FOUND, "Page not found", detail)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn into_report(self) -> ErrorReport {
        self.report
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = match render_error_page(self.status, self.public_message) {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(_) => (self.status, self.public_message).into_response(),
        };
        self.report.attach(&mut response);
        response
    }
}

const STORE_UNAVAILABLE: &str = "Service temporarily unavailable";

fn repo_status(error: &RepoError) -> StatusCode {
    match error {
        RepoError::NotFound => StatusCode::NOT_FOUND,
        RepoError::Persistence(_) | RepoError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
        RepoError::Duplicate { .. }
        | RepoError::InvalidInput { .. }
        | RepoError::Integrity { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn store_failure(source: &'static str, error: &dyn StdError, status: StatusCode) -> HttpError {
    let public = if status == StatusCode::SERVICE_UNAVAILABLE {
        STORE_UNAVAILABLE
    } else if status == StatusCode::NOT_FOUND {
        "Page not found"
    } else {
        "Unexpected error occurred"
    };
    HttpError::from_error(source, status, public, error)
}

impl From<MenuQueryError> for HttpError {
    fn from(error: MenuQueryError) -> Self {
        const SOURCE: &str = "application::menu::MenuQueryService";
        match &error {
            MenuQueryError::UnknownMenu(_)
            | MenuQueryError::NoMenus
            | MenuQueryError::UnknownTag(_)
            | MenuQueryError::UnknownDish(_) => {
                HttpError::from_error(SOURCE, StatusCode::NOT_FOUND, "Page not found", &error)
            }
            MenuQueryError::Repo(inner) => store_failure(SOURCE, &error, repo_status(inner)),
        }
    }
}

impl From<ContentError> for HttpError {
    fn from(error: ContentError) -> Self {
        const SOURCE: &str = "application::content::ContentService";
        match &error {
            ContentError::NotFound { .. } => {
                HttpError::from_error(SOURCE, StatusCode::NOT_FOUND, "Page not found", &error)
            }
            ContentError::Cache(CacheError::Unavailable { .. }) => {
                store_failure(SOURCE, &error, StatusCode::SERVICE_UNAVAILABLE)
            }
            ContentError::Repo(inner) => store_failure(SOURCE, &error, repo_status(inner)),
        }
    }
}

impl From<IntakeError> for HttpError {
    fn from(error: IntakeError) -> Self {
        const SOURCE: &str = "application::intake::IntakeService";
        match &error {
            IntakeError::UnknownPost(_) => {
                HttpError::from_error(SOURCE, StatusCode::NOT_FOUND, "Page not found", &error)
            }
            IntakeError::InvalidBroadcast(_) => HttpError::from_error(
                SOURCE,
                StatusCode::BAD_REQUEST,
                "Request could not be processed",
                &error,
            ),
            IntakeError::Repo(inner) => store_failure(SOURCE, &error, repo_status(inner)),
        }
    }
}

/// Errors surfaced by the command-line entry points.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
