//! `feed`, `notebooks` and `build` commands.
//!
//! Ingestion never fails the process: errors are reported and the command
//! still exits successfully so the static site build can go on.

use crate::config::FolioConfig;
use crate::feed::{self, FeedReport, HttpSource};
use crate::notebook::{self, NotebookReport};
use crate::utils::plural::plural_count;
use crate::{debug, log};

/// Fetch the feed and write post JSON.
pub fn run_feed(config: &FolioConfig) -> Option<FeedReport> {
    match feed::ingest(config, &HttpSource::new(&config.feed)) {
        Ok(report) => {
            debug!("feed"; "fetched: {}, dropped: {}", report.fetched, report.dropped);
            Some(report)
        }
        Err(err) => {
            log!("error"; "feed: {:#}", err);
            None
        }
    }
}

/// Convert notebooks into JSON.
pub fn run_notebooks(config: &FolioConfig) -> Option<NotebookReport> {
    notebook::ingest(config)
        .inspect_err(|err| log!("error"; "notebooks: {:#}", err))
        .ok()
}

/// Both ingesters, one after the other.
pub fn run_build(config: &FolioConfig) {
    let posts = run_feed(config).map_or(0, |r| r.written);
    let notebooks = run_notebooks(config).map_or(0, |r| r.written);
    log!(
        "done";
        "{} and {} under {}",
        plural_count(posts, "post"),
        plural_count(notebooks, "notebook"),
        config.public_dir().display()
    );
}
