//! Notebook ingestion: a directory of `.ipynb` files → per-notebook JSON plus
//! `_notebooks.json`.
//!
//! # Pipeline
//!
//! ```text
//! notebooks/*.ipynb (filename descending)
//!     │
//!     ├── filename      2024-03-15_slug.ipynb → date + slug
//!     ├── frontmatter   first cell `---` block → title, tags, ...
//!     └── cell          markdown / code + classified outputs
//!     │
//!     ▼
//! <slug>.json per notebook + _notebooks.json index
//! ```
//!
//! A file that fails to parse, or has no cells left after processing, is
//! skipped with a diagnostic. A missing source directory yields an empty index.

pub mod cell;
pub mod filename;
pub mod frontmatter;

pub use cell::{Cell, Output};

use crate::config::{FolioConfig, Section};
use crate::logger::ProgressLine;
use crate::utils::{
    date::to_iso_date,
    fs::{clear_previous_run, write_empty_index, write_json},
    plural::plural_count,
    slug::title_from_slug,
};
use crate::{debug, log};
use anyhow::{Context, Result};
use cell::RawNotebook;
use filename::parse_filename;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Index file name inside the notebooks' rendered directory.
pub const NOTEBOOKS_INDEX: &str = "_notebooks.json";

const NOTEBOOK_EXT: &str = "ipynb";

/// Why a single notebook was skipped.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid notebook", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} has no cells to render", path.display())]
    Empty { path: PathBuf },
}

/// Index entry for a notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookMeta {
    pub slug: String,
    /// `YYYY-MM-DD` or empty.
    pub date: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub difficulty: String,
    pub duration: String,
    /// Source file name, e.g. `2024-03-15_intro.ipynb`.
    pub source: String,
    /// Kernel language, used for code highlighting classes.
    pub language: String,
}

/// One notebook as written to `<slug>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookDocument {
    pub meta: NotebookMeta,
    pub cells: Vec<Cell>,
}

/// Outcome of one ingestion run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NotebookReport {
    pub written: usize,
    pub skipped: usize,
}

impl NotebookDocument {
    /// Assemble a document from a parsed notebook.
    ///
    /// Returns `None` when no cell survives processing.
    pub fn build(file_name: &str, raw: &RawNotebook, default_language: &str) -> Option<Self> {
        let name = parse_filename(file_name);

        let mut raw_cells = raw.cells.iter();
        let mut cells = Vec::with_capacity(raw.cells.len());
        let mut front = frontmatter::Frontmatter::default();

        // Frontmatter lives only in the first cell
        if let Some(first) = raw_cells.next() {
            match frontmatter::split(&first.source.join()) {
                Some(split) => {
                    front = split.frontmatter;
                    if !split.rest.is_empty() {
                        cells.push(Cell::Markdown { source: split.rest });
                    }
                }
                None => cells.extend(Cell::from_raw(first)),
            }
        }
        cells.extend(raw_cells.filter_map(Cell::from_raw));

        if cells.is_empty() {
            return None;
        }

        // A frontmatter date overrides the filename; unparseable dates fall back to it
        let date = front
            .date
            .as_deref()
            .map(to_iso_date)
            .filter(|d| !d.is_empty())
            .unwrap_or(name.date);

        let meta = NotebookMeta {
            title: front
                .title
                .unwrap_or_else(|| title_from_slug(&name.slug)),
            slug: name.slug,
            date,
            description: front.description.unwrap_or_default(),
            tags: front.tags,
            difficulty: front.difficulty.unwrap_or_default(),
            duration: front.duration.unwrap_or_default(),
            source: file_name.to_string(),
            language: raw
                .metadata
                .language()
                .unwrap_or_else(|| default_language.to_string()),
        };

        Some(Self { meta, cells })
    }
}

/// Read and process one `.ipynb` file.
pub fn load_notebook(path: &Path, default_language: &str) -> Result<NotebookDocument, IngestError> {
    let content = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawNotebook = serde_json::from_str(&content).map_err(|source| IngestError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    NotebookDocument::build(&file_name, &raw, default_language).ok_or_else(|| {
        IngestError::Empty {
            path: path.to_path_buf(),
        }
    })
}

/// `*.ipynb` files directly inside `dir`, by file name descending.
fn list_notebooks(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == NOTEBOOK_EXT) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
    Ok(paths)
}

/// Convert every notebook in the source directory.
///
/// Any error after the previous run was cleared still leaves `[]` as the
/// index.
pub fn ingest(config: &FolioConfig) -> Result<NotebookReport> {
    let out_dir = config.rendered_dir(Section::Notebooks);
    let index_path = out_dir.join(NOTEBOOKS_INDEX);

    write_notebooks(config, &out_dir).inspect_err(|_| {
        if !write_empty_index(&index_path) {
            debug!("notebook"; "could not write empty index {}", index_path.display());
        }
    })
}

fn write_notebooks(config: &FolioConfig, out_dir: &Path) -> Result<NotebookReport> {
    let source_dir = config.notebooks_source();
    let removed = clear_previous_run(out_dir, NOTEBOOKS_INDEX)?;
    debug!("notebook"; "cleared {} from {}", plural_count(removed, "stale file"), out_dir.display());

    let index_path = out_dir.join(NOTEBOOKS_INDEX);

    if !source_dir.is_dir() {
        log!("notebook"; "{} not found, writing empty index", source_dir.display());
        write_json(&index_path, &Vec::<NotebookMeta>::new())?;
        return Ok(NotebookReport::default());
    }

    let paths = list_notebooks(&source_dir)?;
    let progress = ProgressLine::new(&[("notebooks", paths.len())]);

    let mut report = NotebookReport::default();
    let mut index = Vec::with_capacity(paths.len());
    let mut seen = HashSet::new();

    for path in &paths {
        progress.inc("notebooks");

        let doc = match load_notebook(path, &config.render.code_language) {
            Ok(doc) => doc,
            Err(err) => {
                log!("skip"; "{:#}", anyhow::Error::new(err));
                report.skipped += 1;
                continue;
            }
        };

        if !seen.insert(doc.meta.slug.clone()) {
            log!("skip"; "{}: slug `{}` already taken by a newer notebook", doc.meta.source, doc.meta.slug);
            report.skipped += 1;
            continue;
        }
        if crate::render::validate_slug(&doc.meta.slug).is_none() {
            log!("warn"; "{}: slug `{}` cannot be requested by the renderer", doc.meta.source, doc.meta.slug);
        }

        if let Err(err) = write_json(&out_dir.join(format!("{}.json", doc.meta.slug)), &doc) {
            log!("skip"; "{:#}", err);
            report.skipped += 1;
            continue;
        }
        index.push(doc.meta);
        report.written += 1;
    }

    progress.finish();
    write_json(&index_path, &index)?;

    log!("notebook"; "{} -> {}", plural_count(report.written, "notebook"), out_dir.display());
    if report.skipped > 0 {
        log!("skip"; "{}", plural_count(report.skipped, "notebook"));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_config(root: &Path) -> FolioConfig {
        let mut config = crate::config::test_parse_config("");
        config.root = root.to_path_buf();
        config
    }

    fn write_notebook(dir: &Path, name: &str, value: serde_json::Value) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), value.to_string()).unwrap();
    }

    fn read_index(config: &FolioConfig) -> Vec<NotebookMeta> {
        let path = config.rendered_dir(Section::Notebooks).join(NOTEBOOKS_INDEX);
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn simple_notebook(text: &str) -> serde_json::Value {
        json!({
            "cells": [{"cell_type": "markdown", "source": [text]}],
            "metadata": {},
            "nbformat": 4,
            "nbformat_minor": 5
        })
    }

    #[test]
    fn test_invalid_notebook_skipped() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let source = config.notebooks_source();

        write_notebook(&source, "2024-01-01_first.ipynb", simple_notebook("one"));
        write_notebook(&source, "2024-02-01_second.ipynb", simple_notebook("two"));
        fs::write(source.join("2024-03-01_broken.ipynb"), "{ not json").unwrap();

        let report = ingest(&config).unwrap();
        assert_eq!(
            report,
            NotebookReport {
                written: 2,
                skipped: 1
            }
        );

        let index = read_index(&config);
        let slugs: Vec<_> = index.iter().map(|m| m.slug.as_str()).collect();
        assert_eq!(slugs, vec!["second", "first"]);
        assert_eq!(index[0].title, "Second");
        assert_eq!(index[0].date, "2024-02-01");
        assert_eq!(index[0].language, "python");

        let out = config.rendered_dir(Section::Notebooks);
        assert!(out.join("first.json").exists());
        assert!(!out.join("broken.json").exists());
    }

    #[test]
    fn test_missing_source_dir_writes_empty_index() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());

        let report = ingest(&config).unwrap();
        assert_eq!(report, NotebookReport::default());
        assert!(read_index(&config).is_empty());
    }

    #[test]
    fn test_empty_notebook_skipped() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let source = config.notebooks_source();

        write_notebook(&source, "empty.ipynb", json!({"cells": []}));
        write_notebook(
            &source,
            "only-frontmatter.ipynb",
            json!({"cells": [{"cell_type": "markdown", "source": "---\ntitle: T\n---"}]}),
        );
        write_notebook(&source, "kept.ipynb", simple_notebook("text"));
        fs::write(source.join("notes.txt"), "not a notebook").unwrap();

        let report = ingest(&config).unwrap();
        assert_eq!(report.written, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(read_index(&config)[0].slug, "kept");
    }

    #[test]
    fn test_duplicate_slug_keeps_newest() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let source = config.notebooks_source();

        write_notebook(&source, "2023-01-01_topic.ipynb", simple_notebook("old"));
        write_notebook(&source, "2024-01-01_topic.ipynb", simple_notebook("new"));

        ingest(&config).unwrap();
        let index = read_index(&config);
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].source, "2024-01-01_topic.ipynb");
    }

    #[test]
    fn test_stale_output_removed() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let out = config.rendered_dir(Section::Notebooks);
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join(NOTEBOOKS_INDEX), r#"[{"slug": "gone"}]"#).unwrap();
        fs::write(out.join("gone.json"), "{}").unwrap();
        fs::write(out.join("manifest.json"), "{}").unwrap();

        write_notebook(&config.notebooks_source(), "kept.ipynb", simple_notebook("x"));
        ingest(&config).unwrap();

        assert!(!out.join("gone.json").exists());
        assert!(out.join("kept.json").exists());
        assert!(out.join("manifest.json").exists());
    }

    #[test]
    fn test_failed_write_is_skipped() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let source = config.notebooks_source();
        write_notebook(&source, "2024-01-01_hello.ipynb", simple_notebook("hi"));
        write_notebook(&source, "2024-02-01_other.ipynb", simple_notebook("yo"));

        // A directory squatting on the output file
        fs::create_dir_all(config.rendered_dir(Section::Notebooks).join("hello.json")).unwrap();

        let report = ingest(&config).unwrap();
        assert_eq!(report, NotebookReport { written: 1, skipped: 1 });
        let slugs: Vec<_> = read_index(&config).into_iter().map(|m| m.slug).collect();
        assert_eq!(slugs, vec!["other"]);
    }

    #[test]
    fn test_missing_source_clears_previous_run() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        let out = config.rendered_dir(Section::Notebooks);
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join(NOTEBOOKS_INDEX), r#"[{"slug": "old"}]"#).unwrap();
        fs::write(out.join("old.json"), "{}").unwrap();

        let report = ingest(&config).unwrap();
        assert_eq!(report, NotebookReport::default());
        assert!(read_index(&config).is_empty());
        assert!(!out.join("old.json").exists());
    }

    #[test]
    fn test_build_with_frontmatter() {
        let raw: RawNotebook = serde_json::from_value(json!({
            "cells": [
                {"cell_type": "markdown", "source": [
                    "---\n",
                    "title: \"Pandas Basics\"\n",
                    "date: 2024-06-01\n",
                    "tags: [\"python\", \"data\"]\n",
                    "difficulty: beginner\n",
                    "duration: 15 min\n",
                    "---\n",
                    "Intro paragraph"
                ]},
                {"cell_type": "raw", "source": "ignored"},
                {"cell_type": "code", "execution_count": 1, "source": "1 + 1", "outputs": [
                    {"output_type": "execute_result", "data": {"text/plain": "2"}}
                ]}
            ],
            "metadata": {"kernelspec": {"language": "python3"}}
        }))
        .unwrap();

        let doc = NotebookDocument::build("2024-01-15_pandas.ipynb", &raw, "python").unwrap();
        assert_eq!(doc.meta.slug, "pandas");
        assert_eq!(doc.meta.title, "Pandas Basics");
        assert_eq!(doc.meta.date, "2024-06-01");
        assert_eq!(doc.meta.tags, vec!["python", "data"]);
        assert_eq!(doc.meta.difficulty, "beginner");
        assert_eq!(doc.meta.duration, "15 min");
        assert_eq!(doc.meta.source, "2024-01-15_pandas.ipynb");
        assert_eq!(doc.meta.language, "python3");
        assert_eq!(
            doc.cells,
            vec![
                Cell::Markdown {
                    source: "Intro paragraph".into()
                },
                Cell::Code {
                    source: "1 + 1".into(),
                    execution_count: Some(1),
                    outputs: vec![Output::Text { text: "2".into() }],
                },
            ]
        );
    }

    #[test]
    fn test_build_without_frontmatter_keeps_first_cell() {
        let raw: RawNotebook = serde_json::from_value(simple_notebook("# Just a heading")).unwrap();
        let doc = NotebookDocument::build("intro-to-numpy.ipynb", &raw, "julia").unwrap();
        assert_eq!(doc.meta.title, "Intro To Numpy");
        assert_eq!(doc.meta.date, "");
        assert_eq!(doc.meta.language, "julia");
        assert_eq!(doc.cells.len(), 1);
    }

    #[test]
    fn test_meta_serializes_camel_case() {
        let raw: RawNotebook = serde_json::from_value(simple_notebook("x")).unwrap();
        let doc = NotebookDocument::build("a.ipynb", &raw, "python").unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["meta"]["slug"], "a");
        assert_eq!(value["cells"][0]["type"], "markdown");
    }
}
