//! Page rendering from the pre-rendered JSON.
//!
//! ```text
//! slug ──► validate ──✗──► Redirect(listing)
//!             │
//!             ▼
//!   <section>/_rendered/<slug>.json ──✗──► NotFound page
//!             │
//!             ▼
//!        RenderedPage (re-sanitized)
//! ```

pub mod markdown;
pub mod page;
mod slug;

pub use page::RenderedPage;
pub use slug::{slug_from_query, validate_slug};

use crate::config::{FolioConfig, Section};
use crate::debug;
use crate::feed::FeedItem;
use crate::notebook::NotebookDocument;
use crate::utils::html::escape_attr;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Result of a page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Page(RenderedPage),
    /// Invalid slug: send the visitor to the listing page.
    Redirect(String),
    NotFound(RenderedPage),
}

impl RenderOutcome {
    /// HTML for the outcome; a redirect becomes a meta-refresh stub.
    pub fn to_html(&self) -> String {
        match self {
            Self::Page(page) | Self::NotFound(page) => page.to_html(),
            Self::Redirect(url) => {
                let url = escape_attr(url);
                format!(
                    "<meta http-equiv=\"refresh\" content=\"0; url={url}\">\n\
                     <p><a href=\"{url}\">Continue to the list</a></p>\n"
                )
            }
        }
    }
}

/// Render the document `slug` of `section`.
///
/// No path is built from a slug that fails validation.
pub fn render_page(config: &FolioConfig, section: Section, slug: Option<&str>) -> RenderOutcome {
    let listing = config.listing_url(section);
    let Some(slug) = slug.and_then(validate_slug) else {
        debug!("render"; "rejected slug {:?}, redirecting to {}", slug, listing);
        return RenderOutcome::Redirect(listing);
    };

    let path = config.rendered_dir(section).join(format!("{slug}.json"));
    match load_page(&path, section, &config.render.code_language) {
        Ok(page) => RenderOutcome::Page(page),
        Err(err) => {
            debug!("render"; "{:#}", err);
            RenderOutcome::NotFound(RenderedPage::not_found(&listing))
        }
    }
}

fn load_page(path: &Path, section: Section, code_language: &str) -> Result<RenderedPage> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let page = match section {
        Section::Blog => {
            let post: FeedItem = serde_json::from_str(&content)
                .with_context(|| format!("{} is not a post", path.display()))?;
            RenderedPage::from_post(&post)
        }
        Section::Notebooks => {
            let doc: NotebookDocument = serde_json::from_str(&content)
                .with_context(|| format!("{} is not a notebook", path.display()))?;
            RenderedPage::from_notebook(&doc, code_language)
        }
    };
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::PostMeta;
    use crate::utils::fs::write_json;
    use tempfile::TempDir;

    fn test_config(root: &Path) -> FolioConfig {
        let mut config = crate::config::test_parse_config("");
        config.root = root.to_path_buf();
        config
    }

    fn write_post(config: &FolioConfig, slug: &str, content: &str) {
        let post = FeedItem {
            meta: PostMeta {
                slug: slug.into(),
                title: "Title".into(),
                description: String::new(),
                date: String::new(),
                link: String::new(),
                creator: "Anonymous".into(),
                tags: vec![],
                read_time: "1 min read".into(),
                cover_image: String::new(),
            },
            content: content.into(),
        };
        let path = config
            .rendered_dir(Section::Blog)
            .join(format!("{slug}.json"));
        write_json(&path, &post).unwrap();
    }

    #[test]
    fn test_invalid_slugs_redirect() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        for slug in [None, Some(""), Some("../secret"), Some("a/b"), Some("..")] {
            assert_eq!(
                render_page(&config, Section::Blog, slug),
                RenderOutcome::Redirect("/blog/".into()),
                "{slug:?}"
            );
        }
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let outcome = render_page(&config, Section::Notebooks, Some("nope"));
        let RenderOutcome::NotFound(page) = outcome else {
            panic!("expected not found, got {outcome:?}");
        };
        assert!(page.body.contains("/notebooks/"));
    }

    #[test]
    fn test_malformed_json_is_not_found() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let out = config.rendered_dir(Section::Blog);
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("broken.json"), "{\"meta\": 1").unwrap();

        assert!(matches!(
            render_page(&config, Section::Blog, Some("broken")),
            RenderOutcome::NotFound(_)
        ));
    }

    #[test]
    fn test_post_rendered_and_resanitized() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        write_post(&config, "hello", "<script>alert(1)</script><p>ok</p>");

        let RenderOutcome::Page(page) = render_page(&config, Section::Blog, Some("hello")) else {
            panic!("expected a page");
        };
        assert_eq!(page.body, "<p>ok</p>");
        assert_eq!(page.title, "Title");
    }

    #[test]
    fn test_wrong_section_shape_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(dir.path());
        // Point the notebooks section at the blog output
        config.notebooks.section = "blog".into();
        write_post(&config, "hello", "<p>x</p>");

        assert!(matches!(
            render_page(&config, Section::Notebooks, Some("hello")),
            RenderOutcome::NotFound(_)
        ));
    }

    #[test]
    fn test_redirect_html() {
        let html = RenderOutcome::Redirect("/blog/".into()).to_html();
        assert!(html.contains("url=/blog/"));
        assert!(html.contains("href=\"/blog/\""));
    }
}
