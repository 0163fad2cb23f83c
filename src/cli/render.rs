//! `render` command: one document to HTML on stdout or into a file.

use crate::config::{FolioConfig, Section};
use crate::{debug, log};
use crate::render::{RenderOutcome, render_page, slug_from_query};
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Render `slug` (or the `slug` parameter of `query`) from `section`.
pub fn run_render(
    config: &FolioConfig,
    section: Section,
    slug: Option<&str>,
    query: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let from_query = query.and_then(slug_from_query);
    let slug = slug.or(from_query.as_deref());

    let outcome = render_page(config, section, slug);
    match &outcome {
        RenderOutcome::Page(page) => debug!("render"; "{}", page.title),
        RenderOutcome::Redirect(url) => debug!("render"; "invalid slug, redirecting to {}", url),
        RenderOutcome::NotFound(_) => debug!("render"; "{} not found", slug.unwrap_or_default()),
    }

    let html = outcome.to_html();
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(path, html).with_context(|| format!("failed to write {}", path.display()))?;
            log!("render"; "wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
