//! Embedded stylesheet and image serving.

use axum::{
    body::Body,
    extract::Path,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use include_dir::{Dir, include_dir};
use mime_guess::Mime;

use crate::application::error::ErrorReport;

const SOURCE: &str = "infra::assets::serve_static";

static PUBLIC_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static/public");

/// Serve a file bundled from `static/public`.
pub async fn serve_static(path: Option<Path<String>>) -> Response {
    let captured = path.map(|Path(value)| value).unwrap_or_default();
    match lookup(&PUBLIC_ASSETS, &captured) {
        Some((contents, mime)) => build_response(Bytes::from_static(contents), mime),
        None => {
            let mut response = StatusCode::NOT_FOUND.into_response();
            ErrorReport::from_message(SOURCE, StatusCode::NOT_FOUND, "Static asset not found")
                .attach(&mut response);
            response
        }
    }
}

fn lookup(bundle: &'static Dir<'static>, requested: &str) -> Option<(&'static [u8], Mime)> {
    let candidate = requested.trim_start_matches('/');
    if candidate.is_empty() || candidate.ends_with('/') || candidate.contains("..") {
        return None;
    }

    let file = bundle.get_file(candidate)?;
    let mime = mime_guess::from_path(candidate).first_or_octet_stream();
    Some((file.contents(), mime))
}

fn build_response(bytes: Bytes, mime: Mime) -> Response {
    let len = bytes.len();
    let mut response = Response::new(Body::from(bytes));

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=3600"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylesheet_is_bundled_with_css_mime() {
        let (contents, mime) = lookup(&PUBLIC_ASSETS, "site.css").expect("site.css bundled");
        assert!(!contents.is_empty());
        assert_eq!(mime.essence_str(), "text/css");
    }

    #[test]
    fn traversal_and_directories_are_rejected() {
        assert!(lookup(&PUBLIC_ASSETS, "../Cargo.toml").is_none());
        assert!(lookup(&PUBLIC_ASSETS, "").is_none());
        assert!(lookup(&PUBLIC_ASSETS, "images/").is_none());
    }
}
