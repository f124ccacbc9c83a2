use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, Level, debug, error, info_span, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

const MAX_FORWARDED_ID_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
}

/// Reuse a sane `x-request-id` from a fronting proxy, otherwise mint one.
fn request_id_for(request: &Request<Body>) -> String {
    request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_FORWARDED_ID_LEN
                && id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        })
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = request_id_for(&request);
    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    let ctx = RequestContext { request_id };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), value);
    }
    response.extensions_mut().insert(ctx);
    response
}

/// Every response gets a debug line; 4xx are repeated as warnings and 5xx as
/// errors, with whatever diagnostic chain the handler attached.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();
    let start = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let Some(level) = failure_level(status) else {
        debug!(
            target: "chefer::http::response",
            status = status.as_u16(),
            method = %method,
            path = %path,
            elapsed_ms,
            "request served",
        );
        return response;
    };

    let report = response
        .extensions_mut()
        .remove::<ErrorReport>()
        .unwrap_or(ErrorReport {
            source: "unknown",
            status,
            messages: Vec::new(),
        });
    let detail = report
        .messages
        .first()
        .map(String::as_str)
        .unwrap_or("no diagnostic available");

    macro_rules! emit {
        ($log:ident, $message:literal) => {
            $log!(
                target: "chefer::http::response",
                status = status.as_u16(),
                method = %method,
                path = %path,
                elapsed_ms,
                source = report.source,
                detail = %detail,
                chain = ?report.messages,
                request_id = %request_id,
                $message,
            )
        };
    }
    if level == Level::ERROR {
        emit!(error, "request failed");
    } else {
        emit!(warn, "client request error");
    }

    response
}

fn failure_level(status: StatusCode) -> Option<Level> {
    if status.is_server_error() {
        Some(Level::ERROR)
    } else if status.is_client_error() {
        Some(Level::WARN)
    } else {
        None
    }
}
