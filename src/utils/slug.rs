//! Slug and anchor generation.
//!
//! - [`slugify`] turns a post title into the filename/URL key
//! - [`anchor_id`] turns heading text into a fragment id
//! - [`title_from_slug`] is the reverse direction used when frontmatter has no title

use regex::Regex;
use std::sync::LazyLock;

/// Longest slug written to disk.
pub const MAX_SLUG_LEN: usize = 80;

static SLUG_DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static HYPHENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());
static ANCHOR_DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());

/// Convert a title into a URL-safe slug.
///
/// Lowercase, keep only `[a-z0-9\s-]`, whitespace runs become `-`, repeated
/// hyphens collapse, leading/trailing hyphens are trimmed, and the result is
/// cut to [`MAX_SLUG_LEN`] characters.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("Hello, World! 2024"), "hello-world-2024");
/// ```
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let kept = SLUG_DISALLOWED.replace_all(&lower, "");
    let dashed = WHITESPACE.replace_all(&kept, "-");
    let collapsed = HYPHENS.replace_all(&dashed, "-");
    let trimmed = collapsed.trim_matches('-');

    // Only ASCII survives the filter, so byte truncation is char-safe
    let cut = &trimmed[..trimmed.len().min(MAX_SLUG_LEN)];
    // Truncation may expose a hyphen at the end
    cut.trim_end_matches('-').to_string()
}

/// Build a heading anchor id: lowercase, drop `[^\w\s-]`, whitespace runs become `-`.
pub fn anchor_id(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    let kept = ANCHOR_DISALLOWED.replace_all(&lower, "");
    WHITESPACE.replace_all(kept.trim(), "-").into_owned()
}

/// Derive a display title from a slug: hyphens become spaces, words are capitalized.
///
/// `intro-to-pandas` -> `Intro To Pandas`
pub fn title_from_slug(slug: &str) -> String {
    slug.replace('-', " ")
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_slug_charset(s: &str) -> bool {
        s.bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello, World! 2024"), "hello-world-2024");
        assert_eq!(slugify("  Rust   &   WebAssembly  "), "rust-webassembly");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
        assert_eq!(slugify("--- dashes -- everywhere ---"), "dashes-everywhere");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("日本語"), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_truncates() {
        let title = "word ".repeat(40);
        let slug = slugify(&title);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
        assert!(slug.starts_with("word-word"));
    }

    #[test]
    fn test_slugify_properties() {
        let titles: Vec<String> = vec![
            "Hello, World! 2024".to_string(),
            "A  title\twith\nall   kinds of    space".to_string(),
            "-leading and trailing-".to_string(),
            "Ünïcödé Títle — with dash".to_string(),
            "x".repeat(200),
            "ab-".repeat(50),
            String::new(),
            "   ".to_string(),
        ];

        for title in &titles {
            let slug = slugify(title);
            assert!(is_slug_charset(&slug), "bad charset for {title:?}: {slug}");
            assert!(!slug.starts_with('-') && !slug.ends_with('-'), "{slug}");
            assert!(slug.len() <= MAX_SLUG_LEN, "{slug}");
            assert_eq!(slugify(&slug), slug, "not idempotent for {title:?}");
            assert!(!slug.contains("--"), "{slug}");
        }
    }

    #[test]
    fn test_anchor_id() {
        assert_eq!(anchor_id("Getting Started"), "getting-started");
        assert_eq!(anchor_id("What's new in 2.0?"), "whats-new-in-20");
        assert_eq!(anchor_id("snake_case stays"), "snake_case-stays");
        assert_eq!(anchor_id("  padded  "), "padded");
    }

    #[test]
    fn test_title_from_slug() {
        assert_eq!(title_from_slug("intro-to-pandas"), "Intro To Pandas");
        assert_eq!(title_from_slug("single"), "Single");
        assert_eq!(title_from_slug("a--b"), "A  B");
    }
}
