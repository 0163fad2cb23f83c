//! HTML sanitization policies.
//!
//! Two policies, both built on `ammonia`:
//!
//! | Policy            | Used for                                         |
//! |-------------------|--------------------------------------------------|
//! | [`clean_content`] | feed item bodies, notebook `text/html` outputs   |
//! | [`clean_render`]  | every fragment assembled by the page renderer    |
//!
//! Content is cleaned once at ingestion and again at render time. The second
//! pass does not trust the JSON on disk.
//!
//! Both drop `<script>`/`<style>` including their bodies, every `on*` event
//! attribute and any URL scheme outside the allow-list (`javascript:` included).

use ammonia::Builder;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Extra tags on top of ammonia's defaults.
const EXTRA_TAGS: &[&str] = &["iframe", "figure", "figcaption", "picture", "source"];

/// Embedded media attributes.
const IFRAME_ATTRIBUTES: &[&str] = &[
    "src",
    "width",
    "height",
    "allow",
    "allowfullscreen",
    "frameborder",
    "title",
    "loading",
];

static CONTENT: LazyLock<Builder<'static>> = LazyLock::new(content_policy);
static RENDER: LazyLock<Builder<'static>> = LazyLock::new(render_policy);

/// Rich content: ammonia defaults, iframes, `target` on links, `class` anywhere.
fn content_policy() -> Builder<'static> {
    let mut builder = Builder::default();
    builder
        .add_tags(EXTRA_TAGS)
        .add_tag_attributes("iframe", IFRAME_ATTRIBUTES)
        .add_tag_attributes("a", &["target"])
        .add_tag_attributes("source", &["srcset", "type", "media"])
        .add_tag_attributes("img", &["loading", "srcset"])
        .add_generic_attributes(&["class"]);
    builder
}

/// Render output: the content policy plus heading ids and inline PNG data.
fn render_policy() -> Builder<'static> {
    let mut builder = content_policy();
    builder
        .add_generic_attributes(&["id"])
        .add_url_schemes(&["data"])
        .attribute_filter(|element, attribute, value| {
            if value.trim_start().to_ascii_lowercase().starts_with("data:") {
                // Inline data is only acceptable as an image source
                let is_image = element == "img"
                    && attribute == "src"
                    && value.trim_start()[5..].to_ascii_lowercase().starts_with("image/");
                return is_image.then(|| Cow::Borrowed(value));
            }
            Some(Cow::Borrowed(value))
        });
    builder
}

/// Sanitize ingested HTML (feed content, notebook HTML outputs).
pub fn clean_content(html: &str) -> String {
    CONTENT.clean(html).to_string()
}

/// Sanitize HTML right before it is placed into a rendered page.
pub fn clean_render(html: &str) -> String {
    RENDER.clean(html).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_removed_with_body() {
        let dirty = "<script>alert(1)</script><p>ok</p>";
        assert_eq!(clean_content(dirty), "<p>ok</p>");
        assert_eq!(clean_render(dirty), "<p>ok</p>");
    }

    #[test]
    fn test_event_handler_stripped() {
        let dirty = r#"<div class="plot"><img src="x.png" onerror="alert(1)"><b>fig</b></div>"#;
        let clean = clean_content(dirty);
        assert!(!clean.contains("onerror"));
        assert!(!clean.contains("alert"));
        assert_eq!(clean, r#"<div class="plot"><img src="x.png"><b>fig</b></div>"#);
    }

    #[test]
    fn test_javascript_urls_dropped() {
        let clean = clean_content(r#"<a href="javascript:alert(1)">x</a>"#);
        assert!(!clean.contains("javascript"));
        assert!(clean.contains(">x</a>"));
    }

    #[test]
    fn test_iframe_kept_with_media_attributes() {
        let dirty = r#"<iframe src="https://www.youtube.com/embed/abc" frameborder="0" allow="autoplay" onload="x()"></iframe>"#;
        let clean = clean_content(dirty);
        assert!(clean.starts_with("<iframe"));
        assert!(clean.contains(r#"src="https://www.youtube.com/embed/abc""#));
        assert!(clean.contains(r#"frameborder="0""#));
        assert!(clean.contains(r#"allow="autoplay""#));
        assert!(!clean.contains("onload"));
    }

    #[test]
    fn test_link_target_kept() {
        let clean = clean_content(r#"<a href="https://example.com" target="_blank">x</a>"#);
        assert!(clean.contains(r#"target="_blank""#));
        assert!(clean.contains(r#"href="https://example.com""#));
    }

    #[test]
    fn test_style_removed() {
        let dirty = "<style>body{display:none}</style><table><tr><td>1</td></tr></table>";
        let clean = clean_content(dirty);
        assert!(!clean.contains("display"));
        assert!(clean.contains("<td>1</td>"));
    }

    #[test]
    fn test_content_policy_drops_ids_and_data_urls() {
        let clean = clean_content(r#"<h2 id="x">T</h2><img src="data:image/png;base64,AAAA">"#);
        assert!(!clean.contains("id="));
        assert!(!clean.contains("data:"));
    }

    #[test]
    fn test_render_policy_keeps_ids_and_png_data() {
        let clean = clean_render(r#"<h2 id="intro">T</h2><img src="data:image/png;base64,AAAA">"#);
        assert!(clean.contains(r#"id="intro""#));
        assert!(clean.contains(r#"src="data:image/png;base64,AAAA""#));
    }

    #[test]
    fn test_render_policy_rejects_data_links() {
        let clean = clean_render(r#"<a href="data:text/html,<script>x</script>">x</a>"#);
        assert!(!clean.contains("data:"));
    }
}
