//! Minimal Markdown → HTML conversion for notebook cells.
//!
//! Supported:
//!
//! - fenced code blocks (```` ```lang ````), protected from every other rule
//! - ATX headings `#`..`######`, each with an anchor id
//! - unordered (`-`, `*`, `+`) and ordered (`1.`, `1)`) lists, one level
//! - a paragraph holding a single image becomes a `<figure>` with caption
//! - inline images, links, `**bold**`, `*italic*`, `` `code` `` and line breaks
//!
//! This is not CommonMark. Nested lists, blockquotes, tables, setext
//! headings, reference links and raw HTML passthrough are not supported;
//! raw HTML is escaped. The output is expected to go through the render
//! sanitizer afterwards.

use crate::utils::{
    html::{escape, escape_attr},
    slug::anchor_id,
};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^[ \t]*```[ \t]*([\w+#.-]*)[^\n]*\n(.*?)^[ \t]*```[ \t]*$").unwrap()
});
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*\n").unwrap());
static BLOCK_SLOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\x01(\d+)\x01$").unwrap());
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$").unwrap());
static UNORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*[-*+][ \t]+(.*)$").unwrap());
static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*\d+[.)][ \t]+(.*)$").unwrap());
static STANDALONE_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^!\[([^\]]*)\]\(([^)\s]+)(?:\s+"([^"]*)")?\)$"#).unwrap()
});

static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());
static INLINE_SLOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x02(\d+)\x02").unwrap());
static IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[([^\]]*)\]\(([^)\s]+)(?:\s+&quot;[^)]*?&quot;)?\)"#).unwrap()
});
static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[([^\]]+)\]\(([^)\s]+)(?:\s+&quot;[^)]*?&quot;)?\)"#).unwrap()
});
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+?)\*\*|__([^_]+?)__").unwrap());
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s][^*]*?)\*|\b_([^_]+?)_\b").unwrap());

/// A heading found while converting, for the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub id: String,
    /// Plain heading text.
    pub text: String,
}

/// Converted HTML plus the headings it contains.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Markdown {
    pub html: String,
    pub headings: Vec<Heading>,
}

/// Convert a Markdown source into HTML.
pub fn to_html(source: &str) -> Markdown {
    let source = source.replace("\r\n", "\n");

    // Code blocks leave the text first so no later rule can touch them
    let mut blocks = Vec::new();
    let source = FENCE.replace_all(&source, |caps: &Captures| {
        blocks.push(code_block(&caps[2], &caps[1]));
        format!("\n\n\x01{}\x01\n\n", blocks.len() - 1)
    });

    let mut out = Markdown::default();
    let mut parts = Vec::new();

    for block in BLANK_LINES.split(source.trim()) {
        let lines: Vec<&str> = block.lines().filter(|l| !l.trim().is_empty()).collect();
        let mut rest = lines.as_slice();

        while let Some(first) = rest.first() {
            if let Some(caps) = BLOCK_SLOT.captures(first.trim()) {
                let index: usize = caps[1].parse().unwrap_or(usize::MAX);
                parts.push(blocks.get(index).cloned().unwrap_or_default());
                rest = &rest[1..];
                continue;
            }

            if let Some(caps) = HEADING.captures(first.trim_end()) {
                parts.push(heading(&caps[1], &caps[2], &mut out.headings));
                rest = &rest[1..];
                continue;
            }

            // Lists and paragraphs run until the next heading or code block
            let end = rest[1..]
                .iter()
                .position(|l| HEADING.is_match(l.trim_end()) || BLOCK_SLOT.is_match(l.trim()))
                .map_or(rest.len(), |p| p + 1);
            let (chunk, tail) = rest.split_at(end);
            rest = tail;

            if UNORDERED_ITEM.is_match(first) {
                parts.push(list(chunk, &UNORDERED_ITEM, "ul"));
            } else if ORDERED_ITEM.is_match(first) {
                parts.push(list(chunk, &ORDERED_ITEM, "ol"));
            } else {
                parts.push(paragraph(chunk));
            }
        }
    }

    out.html = parts.join("\n");
    out
}

/// `<pre><code class="language-…">` with the body escaped.
pub fn code_block(code: &str, language: &str) -> String {
    let code = code.trim_end_matches('\n');
    if language.is_empty() {
        format!("<pre><code>{}</code></pre>", escape(code))
    } else {
        format!(
            "<pre><code class=\"language-{}\">{}</code></pre>",
            escape_attr(language),
            escape(code)
        )
    }
}

fn heading(hashes: &str, text: &str, headings: &mut Vec<Heading>) -> String {
    let level = hashes.len() as u8;
    let text = text.trim();
    let id = anchor_id(text);
    headings.push(Heading {
        level,
        id: id.clone(),
        text: text.to_string(),
    });
    format!(
        "<h{level} id=\"{}\">{}</h{level}>",
        escape_attr(&id),
        inline(text)
    )
}

fn list(lines: &[&str], marker: &Regex, tag: &str) -> String {
    let mut items: Vec<String> = Vec::new();
    for line in lines {
        match (marker.captures(line), items.last_mut()) {
            (Some(caps), _) => items.push(caps[1].trim().to_string()),
            // Continuation of the previous item
            (None, Some(last)) => {
                last.push(' ');
                last.push_str(line.trim());
            }
            (None, None) => items.push(line.trim().to_string()),
        }
    }

    let body: String = items
        .iter()
        .map(|item| format!("<li>{}</li>", inline(item)))
        .collect();
    format!("<{tag}>{body}</{tag}>")
}

fn paragraph(lines: &[&str]) -> String {
    if let [line] = lines
        && let Some(caps) = STANDALONE_IMAGE.captures(line.trim())
    {
        let alt = &caps[1];
        let src = &caps[2];
        let caption = caps.get(3).map_or(alt, |m| m.as_str());
        let figcaption = if caption.is_empty() {
            String::new()
        } else {
            format!("<figcaption>{}</figcaption>", escape(caption))
        };
        return format!(
            "<figure><img src=\"{}\" alt=\"{}\">{figcaption}</figure>",
            escape_attr(src),
            escape_attr(alt)
        );
    }

    let body = lines
        .iter()
        .map(|line| inline(line.trim()))
        .collect::<Vec<_>>()
        .join("<br>\n");
    format!("<p>{body}</p>")
}

/// Inline formatting on one line of text. Raw HTML is escaped.
pub fn inline(text: &str) -> String {
    let mut codes = Vec::new();
    let text = INLINE_CODE.replace_all(text, |caps: &Captures| {
        codes.push(format!("<code>{}</code>", escape(&caps[1])));
        format!("\x02{}\x02", codes.len() - 1)
    });

    let text = escape(&text);
    let text = IMAGE.replace_all(&text, r#"<img src="${2}" alt="${1}">"#);
    let text = LINK.replace_all(&text, r#"<a href="${2}">${1}</a>"#);
    let text = BOLD.replace_all(&text, |caps: &Captures| {
        let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        format!("<strong>{inner}</strong>")
    });
    let text = ITALIC.replace_all(&text, |caps: &Captures| {
        let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        format!("<em>{inner}</em>")
    });

    INLINE_SLOT
        .replace_all(&text, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| codes.get(i).cloned())
                .unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_with_ids() {
        let md = to_html("# Intro to Pandas!\n\n### Step 2: Load");
        assert_eq!(
            md.html,
            "<h1 id=\"intro-to-pandas\">Intro to Pandas!</h1>\n<h3 id=\"step-2-load\">Step 2: Load</h3>"
        );
        assert_eq!(md.headings.len(), 2);
        assert_eq!(md.headings[1].level, 3);
        assert_eq!(md.headings[1].id, "step-2-load");
    }

    #[test]
    fn test_heading_keeps_trailing_hash_in_word() {
        let md = to_html("## Learning C#");
        assert_eq!(md.headings[0].text, "Learning C#");
        let md = to_html("## Closed ##");
        assert_eq!(md.headings[0].text, "Closed");
    }

    #[test]
    fn test_heading_followed_by_paragraph_without_blank_line() {
        let md = to_html("## Title\nSome text");
        assert_eq!(md.html, "<h2 id=\"title\">Title</h2>\n<p>Some text</p>");
    }

    #[test]
    fn test_fenced_code_protected() {
        let md = to_html("Before\n\n```python\nx = **not bold**\nif a < b: pass\n```\n\nAfter");
        assert_eq!(
            md.html,
            "<p>Before</p>\n\
             <pre><code class=\"language-python\">x = **not bold**\nif a &lt; b: pass</code></pre>\n\
             <p>After</p>"
        );
    }

    #[test]
    fn test_fence_blank_lines_inside_kept() {
        let md = to_html("```\na\n\nb\n```");
        assert_eq!(md.html, "<pre><code>a\n\nb</code></pre>");
    }

    #[test]
    fn test_unordered_list() {
        let md = to_html("- one\n- **two**\n  continued\n* three");
        assert_eq!(
            md.html,
            "<ul><li>one</li><li><strong>two</strong> continued</li><li>three</li></ul>"
        );
    }

    #[test]
    fn test_ordered_list() {
        let md = to_html("1. first\n2) second");
        assert_eq!(md.html, "<ol><li>first</li><li>second</li></ol>");
    }

    #[test]
    fn test_list_must_start_block() {
        let md = to_html("Intro line\n- not a list");
        assert_eq!(md.html, "<p>Intro line<br>\n- not a list</p>");
    }

    #[test]
    fn test_standalone_image_becomes_figure() {
        let md = to_html("![A chart](plots/chart.png)");
        assert_eq!(
            md.html,
            "<figure><img src=\"plots/chart.png\" alt=\"A chart\"><figcaption>A chart</figcaption></figure>"
        );
        let md = to_html("![](x.png \"Caption\")");
        assert!(md.html.contains("<figcaption>Caption</figcaption>"));
    }

    #[test]
    fn test_inline_formatting() {
        assert_eq!(
            inline("**bold** and *it* and `a*b*c` and [link](https://x.dev/?a=1&b=2)"),
            "<strong>bold</strong> and <em>it</em> and <code>a*b*c</code> and \
             <a href=\"https://x.dev/?a=1&amp;b=2\">link</a>"
        );
        assert_eq!(inline("__b__ _i_"), "<strong>b</strong> <em>i</em>");
        assert_eq!(
            inline("see ![icon](i.png) here"),
            "see <img src=\"i.png\" alt=\"icon\"> here"
        );
    }

    #[test]
    fn test_snake_case_not_italic() {
        assert_eq!(inline("call my_func_name now"), "call my_func_name now");
    }

    #[test]
    fn test_raw_html_escaped() {
        assert_eq!(
            inline("<script>alert(1)</script>"),
            "&lt;script&gt;alert(1)&lt;/script&gt;"
        );
        assert_eq!(inline("`<b>`"), "<code>&lt;b&gt;</code>");
    }

    #[test]
    fn test_paragraph_line_breaks() {
        let md = to_html("line one\nline two\n\nnext");
        assert_eq!(md.html, "<p>line one<br>\nline two</p>\n<p>next</p>");
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(to_html(""), Markdown::default());
        assert_eq!(to_html("  \n\n "), Markdown::default());
    }
}
