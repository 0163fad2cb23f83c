//! Notebook filename convention: `YYYY-MM-DD_slug.ipynb`.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static DATED_STEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})_(.+)$").unwrap());

/// Date and slug encoded in a notebook filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// `YYYY-MM-DD`, or empty when the name has no date prefix.
    pub date: String,
    pub slug: String,
}

/// Split `2024-03-15_intro-to-pandas.ipynb` into date and slug.
///
/// Without a date prefix the whole stem is the slug and the date is empty.
/// The date is taken as written; it is not checked against the calendar.
pub fn parse_filename(name: &str) -> ParsedName {
    let stem = Path::new(name)
        .file_stem()
        .map_or_else(|| name.to_string(), |s| s.to_string_lossy().into_owned());

    match DATED_STEM.captures(&stem) {
        Some(caps) => ParsedName {
            date: caps[1].to_string(),
            slug: caps[2].to_string(),
        },
        None => ParsedName {
            date: String::new(),
            slug: stem,
        },
    }
}
