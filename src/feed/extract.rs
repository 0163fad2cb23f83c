//! Regex-based field extraction from RSS/Atom bodies.
//!
//! The feed is treated as semi-structured text rather than parsed as XML:
//!
//! - [`item_blocks`] splits the body into `<item>` (RSS) or `<entry>` (Atom) blocks
//! - [`tag`] / [`all_tags`] capture the inner text of a named tag, non-greedy across lines
//! - [`attr`] reads one attribute of the first matching (usually self-closing) tag
//!
//! Tag names are matched literally, so namespaced names such as `content:encoded`
//! or `dc:creator` work as-is. CDATA wrappers are unwrapped; text outside CDATA
//! has its entities decoded.
//!
//! Nested tags with the same name (a `<category>` inside a `<category>`) are not
//! supported: the first closing tag ends the capture.

use crate::utils::html::unescape;
use regex::Regex;
use std::sync::LazyLock;

static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<item(?:\s[^>]*)?>(.*?)</item>").unwrap());
static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<entry(?:\s[^>]*)?>(.*?)</entry>").unwrap());
static CDATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());

/// Split a feed body into item blocks: RSS `<item>`, falling back to Atom `<entry>`.
pub fn item_blocks(body: &str) -> Vec<&str> {
    let blocks: Vec<&str> = ITEM_RE
        .captures_iter(body)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if !blocks.is_empty() {
        return blocks;
    }

    ENTRY_RE
        .captures_iter(body)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// `<name ...>inner</name>`; self-closing `<name .../>` never matches.
fn tag_regex(name: &str) -> Option<Regex> {
    let name = regex::escape(name);
    Regex::new(&format!(r"(?s)<{name}(?:\s(?:[^>]*[^/>])?)?>(.*?)</{name}\s*>")).ok()
}

/// First occurrence of `<name>`, cleaned and trimmed. `None` when missing or blank.
pub fn tag(block: &str, name: &str) -> Option<String> {
    tag_regex(name)?
        .captures(block)
        .and_then(|c| c.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|s| !s.is_empty())
}

/// Every occurrence of `<name>` in document order, blanks skipped.
pub fn all_tags(block: &str, name: &str) -> Vec<String> {
    let Some(re) = tag_regex(name) else {
        return Vec::new();
    };
    re.captures_iter(block)
        .filter_map(|c| c.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Attribute `attr` of the first `<name ...>` tag carrying it.
pub fn attr(block: &str, name: &str, attr: &str) -> Option<String> {
    let pattern = format!(
        r#"<{}\s[^>]*?\b{}\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        regex::escape(name),
        regex::escape(attr)
    );
    Regex::new(&pattern)
        .ok()?
        .captures(block)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| unescape(m.as_str().trim()).into_owned())
        .filter(|s| !s.is_empty())
}

/// Unwrap CDATA sections, or decode entities when there are none.
pub fn clean_text(raw: &str) -> String {
    if raw.contains("<![CDATA[") {
        CDATA_RE.replace_all(raw, "$1").trim().to_string()
    } else {
        unescape(raw).trim().to_string()
    }
}
