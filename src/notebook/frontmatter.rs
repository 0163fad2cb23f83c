//! Frontmatter in a notebook's first cell.
//!
//! ```text
//! ---
//! title: "Intro to Pandas"
//! tags: ["python", "data"]
//! difficulty: beginner
//! ---
//! Anything below the closing line stays a regular markdown cell.
//! ```
//!
//! Each line between the delimiters is a `key: value` pair. Matching
//! surrounding quotes are stripped; a bracketed value is read as a JSON array
//! of strings and kept verbatim when it is not one. Lines without a colon
//! are ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DELIMITER: &str = "---";

/// A single frontmatter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrontValue {
    Text(String),
    List(Vec<String>),
}

impl FrontValue {
    /// Parse the right-hand side of a `key: value` line.
    pub fn parse(raw: &str) -> Self {
        let value = strip_quotes(raw.trim());
        if value.starts_with('[') && value.ends_with(']') {
            if let Ok(list) = serde_json::from_str::<Vec<String>>(value) {
                return Self::List(list);
            }
        }
        Self::Text(value.to_string())
    }

    /// Value as display text; lists are joined with `", "`.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::List(items) => items.join(", "),
        }
    }

    /// Value as a list; text is split on commas.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.clone(),
            Self::Text(text) => text
                .split(',')
                .map(|s| strip_quotes(s.trim()).trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

/// Keys the notebook schema understands, plus everything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub difficulty: Option<String>,
    pub duration: Option<String>,
    /// Keys outside the schema, kept as parsed.
    pub extra: BTreeMap<String, FrontValue>,
}

impl Frontmatter {
    fn set(&mut self, key: &str, value: FrontValue) {
        let text = || Some(value.to_text()).filter(|s| !s.is_empty());
        match key {
            "title" => self.title = text(),
            "description" => self.description = text(),
            "date" => self.date = text(),
            "difficulty" => self.difficulty = text(),
            "duration" => self.duration = text(),
            "tags" => self.tags = value.to_list(),
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }
}

/// Frontmatter split off a cell source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub frontmatter: Frontmatter,
    /// Text after the closing delimiter, trimmed; may be empty.
    pub rest: String,
}

/// Split frontmatter off `source`.
///
/// `None` unless the source starts with a `---` line and a closing `---`
/// line follows.
pub fn split(source: &str) -> Option<Split> {
    let mut lines = source.trim_start_matches('\u{feff}').lines();
    if lines.next()?.trim_end() != DELIMITER {
        return None;
    }

    let mut frontmatter = Frontmatter::default();
    let mut closed = false;
    let mut rest = Vec::new();

    for line in lines.by_ref() {
        if line.trim_end() == DELIMITER {
            closed = true;
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if !key.is_empty() {
                frontmatter.set(key, FrontValue::parse(value));
            }
        }
    }
    if !closed {
        return None;
    }
    rest.extend(lines);

    Some(Split {
        frontmatter,
        rest: rest.join("\n").trim().to_string(),
    })
}

/// Strip one pair of matching `"` or `'` quotes.
fn strip_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_block() {
        let source = "---\ntitle: \"Intro to Pandas\"\ndescription: 'Frames: the basics'\n\
                      date: 2024-05-01\ntags: [\"python\", \"data\"]\ndifficulty: beginner\n\
                      duration: 20 min\nseries: basics\n---\n";
        let split = split(source).unwrap();
        let fm = split.frontmatter;
        assert_eq!(fm.title.as_deref(), Some("Intro to Pandas"));
        // Only the first colon separates key from value
        assert_eq!(fm.description.as_deref(), Some("Frames: the basics"));
        assert_eq!(fm.date.as_deref(), Some("2024-05-01"));
        assert_eq!(fm.tags, vec!["python", "data"]);
        assert_eq!(fm.difficulty.as_deref(), Some("beginner"));
        assert_eq!(fm.duration.as_deref(), Some("20 min"));
        assert_eq!(
            fm.extra.get("series"),
            Some(&FrontValue::Text("basics".into()))
        );
        assert_eq!(split.rest, "");
    }

    #[test]
    fn test_json_array_round_trip() {
        for list in [
            vec![],
            vec!["one".to_string()],
            vec!["a b".to_string(), "c, d".to_string(), "é".to_string()],
        ] {
            let line = serde_json::to_string(&list).unwrap();
            assert_eq!(FrontValue::parse(&line), FrontValue::List(list));
        }
    }

    #[test]
    fn test_malformed_array_kept_raw() {
        assert_eq!(
            FrontValue::parse("[python, data"),
            FrontValue::Text("[python, data".into())
        );
        assert_eq!(
            FrontValue::parse("[python, data]"),
            FrontValue::Text("[python, data]".into())
        );
        assert_eq!(
            FrontValue::parse("[1, 2]"),
            FrontValue::Text("[1, 2]".into())
        );
    }

    #[test]
    fn test_comma_separated_tags() {
        let split = split("---\ntags: python, \"data\" , ,viz\n---").unwrap();
        assert_eq!(split.frontmatter.tags, vec!["python", "data", "viz"]);

        // Malformed arrays still yield tags from their raw text
        let split = super::split("---\ntags: [python, data]\n---").unwrap();
        assert_eq!(split.frontmatter.tags, vec!["[python", "data]"]);
    }

    #[test]
    fn test_rest_kept() {
        let split = split("---\ntitle: T\n---\n\n# Heading\n\nBody").unwrap();
        assert_eq!(split.rest, "# Heading\n\nBody");
    }

    #[test]
    fn test_not_frontmatter() {
        assert!(split("# Title\n---\n").is_none());
        assert!(split("").is_none());
        // Unclosed block
        assert!(split("---\ntitle: T\nstill going").is_none());
        assert!(split("----\ntitle: T\n---").is_none());
    }

    #[test]
    fn test_lines_without_colon_and_empty_values() {
        let split = split("---\njust text\ntitle:\n: orphan\n---").unwrap();
        assert_eq!(split.frontmatter, Frontmatter::default());
    }

    #[test]
    fn test_strip_quotes_only_matching() {
        assert_eq!(strip_quotes("\"a\""), "a");
        assert_eq!(strip_quotes("'a'"), "a");
        assert_eq!(strip_quotes("\"a'"), "\"a'");
        assert_eq!(strip_quotes("\""), "\"");
    }
}
