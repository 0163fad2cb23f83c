//! HTML text utility functions.
//!
//! Provides the text-level helpers shared by the ingesters and the renderer:
//! - `escape()`, `escape_attr()` - HTML entity escaping
//! - `unescape()` - entity decoding for feed fields outside CDATA
//! - `strip_tags()`, `collapse_whitespace()` - plain-text extraction
//! - `strip_ansi()` - terminal color codes out of notebook tracebacks

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters that require HTML escaping.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Get the HTML entity for a special character.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML special characters in text content.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
#[inline]
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escape HTML attribute values.
///
/// Identical to `escape()` but semantically indicates attribute context.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    escape(s)
}

/// Unescape HTML entities back to characters.
///
/// Handles common named entities and numeric character references.
/// Anything unrecognized is left as written.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        rest = &rest[amp..];

        // Entities are short; a missing `;` nearby means a bare ampersand
        let Some(semi) = rest[1..].find(';').filter(|&i| i > 0 && i <= 10) else {
            result.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..=semi];

        let decoded = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{00A0}'),
            "hellip" => Some('…'),
            "mdash" => Some('—'),
            "ndash" => Some('–'),
            "rsquo" => Some('’'),
            "lsquo" => Some('‘'),
            "rdquo" => Some('”'),
            "ldquo" => Some('“'),
            e if e.starts_with("#x") || e.starts_with("#X") => {
                u32::from_str_radix(&e[2..], 16).ok().and_then(char::from_u32)
            }
            e if e.starts_with('#') => e[1..].parse().ok().and_then(char::from_u32),
            _ => None,
        };

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &rest[semi + 2..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);

    Cow::Owned(result)
}

// =============================================================================
// Plain Text Extraction
// =============================================================================

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Remove every `<...>` tag, keeping the text between them.
///
/// Tags are replaced by a space so adjacent words don't fuse.
pub fn strip_tags(s: &str) -> Cow<'_, str> {
    TAG_RE.replace_all(s, " ")
}

/// Collapse whitespace runs into single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").trim().to_string()
}

/// Visible text of an HTML fragment: tags stripped, entities decoded, whitespace collapsed.
pub fn plain_text(html: &str) -> String {
    let stripped = strip_tags(html);
    collapse_whitespace(&unescape(&stripped))
}

// =============================================================================
// ANSI Escape Removal
// =============================================================================

/// Remove ANSI escape sequences (`ESC [ ... letter`).
///
/// Jupyter tracebacks carry terminal colors; the JSON contract stores plain text.
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\x1b' {
            result.push(c);
            continue;
        }
        if chars.peek() == Some(&'[') {
            chars.next(); // consume '['
            // Parameters and intermediates, then one final byte
            while let Some(&ch) = chars.peek() {
                chars.next();
                if ch.is_ascii_alphabetic() {
                    break;
                }
            }
        }
    }

    Cow::Owned(result)
}

// =============================================================================
// Tests
// =============================================================================
