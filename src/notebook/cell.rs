//! `.ipynb` cells and outputs.
//!
//! The `Raw*` types mirror the nbformat 4 JSON closely enough to read
//! what the site renders and nothing more. [`Cell`] and [`Output`] are the
//! shapes written to disk.

use crate::sanitize::clean_content;
use crate::utils::html::strip_ansi;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// nbformat input
// ============================================================================

/// Notebook text fields are either one string or a list of lines.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MultiLine {
    One(String),
    Lines(Vec<String>),
}

impl Default for MultiLine {
    fn default() -> Self {
        Self::One(String::new())
    }
}

impl MultiLine {
    /// Lines already carry their own `\n`, so they concatenate as-is.
    pub fn join(&self) -> String {
        match self {
            Self::One(text) => text.clone(),
            Self::Lines(lines) => lines.concat(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RawNotebook {
    #[serde(default)]
    pub cells: Vec<RawCell>,
    #[serde(default)]
    pub metadata: RawMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub language_info: Option<LanguageInfo>,
    #[serde(default)]
    pub kernelspec: Option<KernelSpec>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LanguageInfo {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KernelSpec {
    pub language: Option<String>,
}

impl RawMetadata {
    /// Kernel language, if the notebook declares one.
    pub fn language(&self) -> Option<String> {
        self.language_info
            .as_ref()
            .and_then(|info| info.name.clone())
            .or_else(|| self.kernelspec.as_ref().and_then(|k| k.language.clone()))
            .map(|lang| lang.trim().to_lowercase())
            .filter(|lang| !lang.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct RawCell {
    pub cell_type: String,
    #[serde(default)]
    pub source: MultiLine,
    #[serde(default)]
    pub execution_count: Option<u32>,
    #[serde(default)]
    pub outputs: Vec<RawOutput>,
}

#[derive(Debug, Deserialize)]
pub struct RawOutput {
    pub output_type: String,
    /// MIME bundle of `execute_result` / `display_data`.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Body of a `stream` output.
    #[serde(default)]
    pub text: MultiLine,
    #[serde(default)]
    pub ename: String,
    #[serde(default)]
    pub evalue: String,
    #[serde(default)]
    pub traceback: Vec<String>,
}

// ============================================================================
// processed output
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Cell {
    Markdown {
        source: String,
    },
    Code {
        source: String,
        #[serde(rename = "executionCount")]
        execution_count: Option<u32>,
        outputs: Vec<Output>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Output {
    Text {
        text: String,
    },
    /// `data:image/png;base64,...`
    Image {
        src: String,
    },
    /// Sanitized HTML.
    Html {
        html: String,
    },
    Error {
        ename: String,
        evalue: String,
        /// ANSI colors stripped, frames joined with `\n`.
        traceback: String,
    },
}

impl Cell {
    /// Classify a raw cell. Raw cells and blank markdown cells yield `None`.
    pub fn from_raw(raw: &RawCell) -> Option<Self> {
        let source = raw.source.join();
        match raw.cell_type.as_str() {
            "markdown" if !source.trim().is_empty() => Some(Self::Markdown { source }),
            "code" => Some(Self::Code {
                source: source.trim_end().to_string(),
                execution_count: raw.execution_count,
                outputs: raw.outputs.iter().filter_map(Output::from_raw).collect(),
            }),
            _ => None,
        }
    }
}

impl Output {
    /// Classify one output: PNG, then HTML, then plain text.
    ///
    /// Outputs with nothing renderable (widget state, JSON-only bundles) are dropped.
    pub fn from_raw(raw: &RawOutput) -> Option<Self> {
        match raw.output_type.as_str() {
            "stream" => Some(Self::Text {
                text: raw.text.join(),
            }),
            "error" => Some(Self::Error {
                ename: raw.ename.clone(),
                evalue: strip_ansi(&raw.evalue).into_owned(),
                traceback: strip_ansi(&raw.traceback.join("\n")).into_owned(),
            }),
            "execute_result" | "display_data" => Self::from_bundle(&raw.data),
            _ => None,
        }
    }

    fn from_bundle(data: &Map<String, Value>) -> Option<Self> {
        if let Some(png) = data.get("image/png").and_then(mime_text) {
            let payload: String = png.chars().filter(|c| !c.is_whitespace()).collect();
            return Some(Self::Image {
                src: format!("data:image/png;base64,{payload}"),
            });
        }
        if let Some(html) = data.get("text/html").and_then(mime_text) {
            return Some(Self::Html {
                html: clean_content(&html),
            });
        }
        data.get("text/plain")
            .and_then(mime_text)
            .map(|text| Self::Text { text })
    }
}

/// A MIME bundle entry: one string or a list of lines.
fn mime_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(lines) => lines
            .iter()
            .map(|line| line.as_str())
            .collect::<Option<Vec<_>>>()
            .map(|lines| lines.concat()),
        _ => None,
    }
}
