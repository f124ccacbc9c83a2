//! Slug derivation for tag URLs (`/dishes/tag/{slug}/`).
//!
//! Slugs are ASCII, lower-case and hyphen-separated. Uniqueness is decided by
//! a caller-supplied predicate so the derivation itself stays pure.

use slug::slugify;
use thiserror::Error;

const MAX_SUFFIX_ATTEMPTS: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
}

/// Derive a base slug from a tag or dish name.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(input);
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Produce a slug for which `is_unique` returns `true`, suffixing `-2`, `-3`, …
/// on collision.
pub fn generate_unique_slug<F>(input: &str, mut is_unique: F) -> Result<String, SlugError>
where
    F: FnMut(&str) -> bool,
{
    let base = derive_slug(input)?;

    if is_unique(&base) {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = format!("{base}-{attempt}");
        if is_unique(&candidate) {
            return Ok(candidate);
        }
    }

    Err(SlugError::Exhausted { base })
}
