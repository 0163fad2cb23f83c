//! Page assembly from rendered JSON.
//!
//! Every HTML fragment that came from a JSON file goes through
//! [`clean_render`] here again, whatever the ingester already did. Plain
//! strings (title, tags, meta row) are escaped.

use super::markdown::{self, Heading};
use crate::feed::FeedItem;
use crate::notebook::{Cell, NotebookDocument, Output};
use crate::sanitize::clean_render;
use crate::utils::{
    date::DateTimeUtc,
    html::{escape, escape_attr, plain_text},
    slug::anchor_id,
};
use regex::{Captures, Regex};
use std::fmt::Write;
use std::sync::LazyLock;

static HEADING_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<h([1-6])((?:\s[^>]*)?)>(.*?)</h[1-6]>").unwrap()
});

static ID_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:^|\s)id\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

/// Deepest heading level listed in the table of contents.
const TOC_MAX_LEVEL: u8 = 3;

/// A page ready to be placed into the site's post template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Meta row entries (date, author, read time, ...), in display order.
    pub meta: Vec<String>,
    /// Sanitized body HTML.
    pub body: String,
    pub toc: Vec<Heading>,
}

impl RenderedPage {
    /// Page for a post file.
    pub fn from_post(post: &FeedItem) -> Self {
        // Ids go in on normalized markup; the final pass runs on the result
        let (body, headings) = with_heading_ids(&clean_render(&post.content));
        let body = clean_render(&body);
        let meta = &post.meta;
        Self {
            title: meta.title.clone(),
            description: meta.description.clone(),
            tags: meta.tags.clone(),
            meta: meta_row([
                display_date(&meta.date),
                meta.creator.clone(),
                meta.read_time.clone(),
            ]),
            body,
            toc: toc_entries(headings),
        }
    }

    /// Page for a notebook document.
    pub fn from_notebook(doc: &NotebookDocument, fallback_language: &str) -> Self {
        let language = if doc.meta.language.is_empty() {
            fallback_language
        } else {
            doc.meta.language.as_str()
        };

        let mut body = String::new();
        let mut headings = Vec::new();
        for cell in &doc.cells {
            let fragment = match cell {
                Cell::Markdown { source } => {
                    let md = markdown::to_html(source);
                    headings.extend(md.headings);
                    format!("<div class=\"cell markdown-cell\">{}</div>", md.html)
                }
                Cell::Code {
                    source,
                    execution_count,
                    outputs,
                } => code_cell(source, *execution_count, outputs, language),
            };
            body.push_str(&clean_render(&fragment));
            body.push('\n');
        }

        let meta = &doc.meta;
        Self {
            title: meta.title.clone(),
            description: meta.description.clone(),
            tags: meta.tags.clone(),
            meta: meta_row([
                display_date(&meta.date),
                meta.difficulty.clone(),
                meta.duration.clone(),
            ]),
            body,
            toc: toc_entries(headings),
        }
    }

    /// Visible fallback when the requested document cannot be loaded.
    pub fn not_found(listing_url: &str) -> Self {
        Self {
            title: "Not found".into(),
            description: "The page you are looking for does not exist or could not be loaded."
                .into(),
            body: format!(
                "<p class=\"not-found\"><a href=\"{}\">Back to the list</a></p>",
                escape_attr(listing_url)
            ),
            ..Self::default()
        }
    }

    /// HTML for the post template, using its fixed element ids.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        let _ = writeln!(html, "<h1 id=\"post-title\">{}</h1>", escape(&self.title));
        let _ = writeln!(
            html,
            "<p id=\"post-description\">{}</p>",
            escape(&self.description)
        );

        html.push_str("<div id=\"post-tags\">");
        for tag in &self.tags {
            let _ = write!(html, "<span class=\"tag\">{}</span>", escape(tag));
        }
        html.push_str("</div>\n<div id=\"post-meta\">");
        for item in &self.meta {
            let _ = write!(html, "<span>{}</span>", escape(item));
        }
        html.push_str("</div>\n<nav id=\"toc\">");
        if !self.toc.is_empty() {
            html.push_str("<ul>");
            for heading in &self.toc {
                let _ = write!(
                    html,
                    "<li class=\"toc-h{}\"><a href=\"#{}\">{}</a></li>",
                    heading.level,
                    escape_attr(&heading.id),
                    escape(&heading.text)
                );
            }
            html.push_str("</ul>");
        }
        let _ = write!(html, "</nav>\n<div id=\"post-body\">{}</div>\n", self.body);
        html
    }
}

fn code_cell(
    source: &str,
    execution_count: Option<u32>,
    outputs: &[Output],
    language: &str,
) -> String {
    let mut html = String::from("<div class=\"cell code-cell\">");
    if let Some(count) = execution_count {
        let _ = write!(html, "<div class=\"execution-count\">In [{count}]:</div>");
    }
    html.push_str(&markdown::code_block(source, language));

    for output in outputs {
        match output {
            Output::Text { text } => {
                let _ = write!(html, "<pre class=\"output-text\">{}</pre>", escape(text));
            }
            Output::Image { src } => {
                let _ = write!(
                    html,
                    "<img class=\"output-image\" src=\"{}\" alt=\"Cell output\">",
                    escape_attr(src)
                );
            }
            Output::Html { html: fragment } => {
                let _ = write!(html, "<div class=\"output-html\">{fragment}</div>");
            }
            Output::Error {
                ename,
                evalue,
                traceback,
            } => {
                let _ = write!(
                    html,
                    "<pre class=\"output-error\"><strong>{}: {}</strong>\n{}</pre>",
                    escape(ename),
                    escape(evalue),
                    escape(traceback)
                );
            }
        }
    }
    html.push_str("</div>");
    html
}

/// Give every heading without an id one derived from its text.
fn with_heading_ids(html: &str) -> (String, Vec<Heading>) {
    let mut headings = Vec::new();
    let html = HEADING_TAG.replace_all(html, |caps: &Captures| {
        let level: u8 = caps[1].parse().unwrap_or(1);
        let attrs = &caps[2];
        let text = plain_text(&caps[3]);
        let existing = ID_ATTR
            .captures(attrs)
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().to_string());
        let has_id = existing.is_some();

        let id = existing.unwrap_or_else(|| anchor_id(&text));
        if id.is_empty() {
            return caps[0].to_string();
        }
        headings.push(Heading {
            level,
            id: id.clone(),
            text,
        });

        if has_id {
            caps[0].to_string()
        } else {
            format!("<h{level}{attrs} id=\"{}\">{}</h{level}>", escape_attr(&id), &caps[3])
        }
    });
    (html.into_owned(), headings)
}

fn toc_entries(headings: Vec<Heading>) -> Vec<Heading> {
    headings
        .into_iter()
        .filter(|h| h.level <= TOC_MAX_LEVEL)
        .collect()
}

/// `2024-09-10` -> `Sep 10, 2024`; anything unparseable is shown as written.
fn display_date(date: &str) -> String {
    DateTimeUtc::parse_any(date).map_or_else(|| date.to_string(), DateTimeUtc::to_display)
}

fn meta_row<const N: usize>(items: [String; N]) -> Vec<String> {
    items.into_iter().filter(|s| !s.is_empty()).collect()
}
