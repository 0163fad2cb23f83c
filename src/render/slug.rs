//! Slug validation for page requests.
//!
//! The slug names a file under the section's rendered directory, so anything
//! outside `[a-zA-Z0-9_-]` is refused before a path is ever built from it.

use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;

static SAFE_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());

/// Return `slug` when it is safe to use as a file stem.
pub fn validate_slug(slug: &str) -> Option<&str> {
    SAFE_SLUG.is_match(slug).then_some(slug)
}

/// The `slug` parameter of a query string such as `?slug=intro&ref=home`.
///
/// Percent-encoding is decoded. The value is not validated here.
pub fn slug_from_query(query: &str) -> Option<String> {
    let query = query.trim().trim_start_matches('?');
    let mut url = Url::parse("http://localhost/").ok()?;
    url.set_query(Some(query));
    url.query_pairs()
        .find(|(key, _)| key == "slug")
        .map(|(_, value)| value.into_owned())
}
