//! Feed ingestion: RSS/Atom → sanitized per-post JSON plus `_posts.json`.
//!
//! ```text
//! fetch ──► item blocks ──► FeedItem (slug, sanitize, read time, cover)
//!                               │
//!                 dedupe by slug, newest first
//!                               │
//!             <slug>.json per post + _posts.json index
//! ```
//!
//! A failed fetch is not an error: the index is written as `[]` and the build
//! carries on without posts.

pub mod extract;
pub mod fetch;
pub mod item;

pub use fetch::{FeedSource, FetchError, HttpSource};
pub use item::{FeedItem, ItemDefaults, PostMeta};

use crate::config::{FeedSectionConfig, FolioConfig, Section};
use crate::logger::ProgressLine;
use crate::utils::fs::{clear_previous_run, write_empty_index, write_json};
use crate::utils::plural::plural_count;
use crate::{debug, log};
use anyhow::Result;
use std::path::Path;

/// Index file name inside the blog's rendered directory.
pub const POSTS_INDEX: &str = "_posts.json";

/// Outcome of one ingestion run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FeedReport {
    /// Whether the feed body was retrieved.
    pub fetched: bool,
    /// Posts written.
    pub written: usize,
    /// Items dropped for lack of a usable title or a failed write.
    pub dropped: usize,
}

impl From<&FeedSectionConfig> for ItemDefaults {
    fn from(config: &FeedSectionConfig) -> Self {
        Self {
            creator: config.default_creator.clone(),
            words_per_minute: config.words_per_minute,
        }
    }
}

/// Items parsed from one feed body.
#[derive(Debug, Default)]
pub struct ParsedFeed {
    /// Unique by slug, newest first.
    pub items: Vec<FeedItem>,
    pub dropped: usize,
}

/// Parse every item of a feed body.
///
/// A later item whose slug collides with an earlier one replaces it.
/// Items are sorted by date descending; undated items go last in feed order.
pub fn parse_feed(body: &str, defaults: &ItemDefaults) -> ParsedFeed {
    let mut parsed = ParsedFeed::default();

    for block in extract::item_blocks(body) {
        let Some(item) = FeedItem::from_block(block, defaults) else {
            parsed.dropped += 1;
            continue;
        };

        match parsed
            .items
            .iter()
            .position(|existing| existing.meta.slug == item.meta.slug)
        {
            Some(pos) => {
                debug!("feed"; "slug `{}` seen twice, keeping the later item", item.meta.slug);
                parsed.items[pos] = item;
            }
            None => parsed.items.push(item),
        }
    }

    parsed.items.sort_by(|a, b| b.meta.date.cmp(&a.meta.date));
    parsed
}

/// Fetch the configured feed and write the blog's rendered directory.
///
/// Any error after the previous run was cleared still leaves `[]` as the
/// index, so the site never finds the blog without one.
pub fn ingest(config: &FolioConfig, source: &dyn FeedSource) -> Result<FeedReport> {
    let out_dir = config.rendered_dir(Section::Blog);
    let index_path = out_dir.join(POSTS_INDEX);

    write_posts(config, source, &out_dir).inspect_err(|_| {
        if !write_empty_index(&index_path) {
            debug!("feed"; "could not write empty index {}", index_path.display());
        }
    })
}

fn write_posts(config: &FolioConfig, source: &dyn FeedSource, out_dir: &Path) -> Result<FeedReport> {
    let removed = clear_previous_run(out_dir, POSTS_INDEX)?;
    debug!("feed"; "cleared {} from {}", plural_count(removed, "stale file"), out_dir.display());

    let index_path = out_dir.join(POSTS_INDEX);

    let body = match source.fetch(&config.feed.url) {
        Ok(body) => body,
        Err(err) => {
            log!("feed"; "fetch failed, writing empty index: {:#}", anyhow::Error::new(err));
            write_json(&index_path, &Vec::<PostMeta>::new())?;
            return Ok(FeedReport::default());
        }
    };

    let parsed = parse_feed(&body, &ItemDefaults::from(&config.feed));
    let mut report = FeedReport {
        fetched: true,
        written: 0,
        dropped: parsed.dropped,
    };

    let progress = ProgressLine::new(&[("posts", parsed.items.len())]);
    let mut index = Vec::with_capacity(parsed.items.len());
    for item in &parsed.items {
        progress.inc("posts");
        let path = out_dir.join(format!("{}.json", item.meta.slug));
        if let Err(err) = write_json(&path, item) {
            log!("skip"; "{:#}", err);
            report.dropped += 1;
            continue;
        }
        index.push(&item.meta);
        report.written += 1;
    }
    progress.finish();

    write_json(&index_path, &index)?;

    if report.dropped > 0 {
        log!("skip"; "{} not written", plural_count(report.dropped, "item"));
    }
    log!("feed"; "{} -> {}", plural_count(report.written, "post"), out_dir.display());

    Ok(report)
}
