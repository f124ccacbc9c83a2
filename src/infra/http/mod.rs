mod forms;
mod menu;
mod middleware;
mod public;

pub use middleware::RequestContext;
pub use public::{HttpState, build_router};

use crate::application::error::{ErrorReport, HttpError};
use crate::application::repos::RepoError;
use crate::presentation::views::{LayoutChrome, render_not_found_response};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

fn db_health_response(result: Result<(), RepoError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

/// Render a service failure. Not-found errors get the full site chrome so the
/// visitor can navigate on; everything else uses the standalone error page.
fn failure_response(chrome: LayoutChrome, error: impl Into<HttpError>) -> Response {
    let error = error.into();
    if error.status() == StatusCode::NOT_FOUND {
        let mut response = render_not_found_response(chrome);
        error.into_report().attach(&mut response);
        response
    } else {
        error.into_response()
    }
}
