//! Post assembly from one feed item block.

use super::extract::{all_tags, attr, tag};
use crate::sanitize::clean_content;
use crate::utils::{
    date::to_iso_date,
    html::{collapse_whitespace, plain_text, strip_tags, unescape},
    slug::slugify,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static IMG_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img\s[^>]*?\bsrc\s*=\s*"([^"]+)""#).unwrap());

/// Index entry for a post: every field except the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    pub slug: String,
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD` (UTC) or empty.
    pub date: String,
    pub link: String,
    pub creator: String,
    pub tags: Vec<String>,
    pub read_time: String,
    pub cover_image: String,
}

/// One post as written to `<slug>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub meta: PostMeta,
    /// Sanitized HTML body.
    pub content: String,
}

/// Values an item falls back to or is computed with.
#[derive(Debug, Clone)]
pub struct ItemDefaults {
    pub creator: String,
    pub words_per_minute: u32,
}

impl FeedItem {
    /// Build a post from an `<item>`/`<entry>` block.
    ///
    /// Returns `None` when the title is missing or slugifies to nothing.
    pub fn from_block(block: &str, defaults: &ItemDefaults) -> Option<Self> {
        let title = tag(block, "title").map(|t| plain_text(&t))?;
        let slug = slugify(&title);
        if slug.is_empty() {
            return None;
        }

        let raw_description = tag(block, "description").or_else(|| tag(block, "summary"));
        let description = raw_description
            .as_deref()
            .map(plain_text)
            .unwrap_or_default();

        let raw_content = tag(block, "content:encoded")
            .or_else(|| tag(block, "content"))
            .or(raw_description)
            .unwrap_or_default();
        let content = clean_content(&raw_content);

        let date = ["pubDate", "published", "updated", "dc:date"]
            .iter()
            .find_map(|name| tag(block, name))
            .map(|d| to_iso_date(&d))
            .unwrap_or_default();

        let link = tag(block, "link")
            .or_else(|| attr(block, "link", "href"))
            .unwrap_or_default();

        let creator = tag(block, "dc:creator")
            .or_else(|| tag(block, "author").map(|a| tag(&a, "name").unwrap_or(a)))
            .map(|c| plain_text(&c))
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| defaults.creator.clone());

        let mut tags = all_tags(block, "category");
        if tags.is_empty() {
            // Atom categories carry their name in `term`
            tags = atom_terms(block);
        }

        let read_time = read_time(&content, defaults.words_per_minute);
        let cover_image = cover_image(block, &content);

        Some(Self {
            meta: PostMeta {
                slug,
                title,
                description,
                date,
                link,
                creator,
                tags,
                read_time,
                cover_image,
            },
            content,
        })
    }
}

fn atom_terms(block: &str) -> Vec<String> {
    static TERM_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"<category\s[^>]*?\bterm\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
    });
    TERM_RE
        .captures_iter(block)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| unescape(m.as_str().trim()).into_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Estimated reading time: `"<N> min read"`, never below one minute.
pub fn read_time(html: &str, words_per_minute: u32) -> String {
    let text = collapse_whitespace(&strip_tags(html));
    let words = if text.is_empty() {
        0
    } else {
        text.split(' ').count()
    };
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let minutes = ((words as f64 / f64::from(words_per_minute.max(1))).round() as u64).max(1);
    format!("{minutes} min read")
}

/// Enclosure, then the first image in the sanitized body, then media
/// thumbnails.
fn cover_image(block: &str, content: &str) -> String {
    attr(block, "enclosure", "url")
        .or_else(|| {
            IMG_SRC_RE
                .captures(content)
                .and_then(|c| c.get(1))
                .map(|m| unescape(m.as_str()).into_owned())
        })
        .or_else(|| attr(block, "media:content", "url"))
        .or_else(|| attr(block, "media:thumbnail", "url"))
        .unwrap_or_default()
}
