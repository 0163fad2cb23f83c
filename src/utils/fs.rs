//! JSON output helpers.
//!
//! Each run fully replaces its own output: the documents listed in the
//! previous index are removed first, then every document and the index are
//! written fresh. Files the pipeline did not write are never touched.

use std::fs;
use std::path::{Component, Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Serialize `value` as pretty JSON into `path`, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Write `[]` as the index, ignoring failures.
///
/// Used on error paths so the site always finds a readable index.
pub fn write_empty_index(path: &Path) -> bool {
    write_json(path, &[] as &[()]).is_ok()
}

/// Only the part of an index entry needed to locate its document.
#[derive(Deserialize)]
struct IndexEntry {
    slug: String,
}

/// `<slug>.json` when `slug` names a plain file inside the output directory.
fn document_file(slug: &str) -> Option<String> {
    let mut components = Path::new(slug).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(format!("{slug}.json")),
        _ => None,
    }
}

/// Ensure `dir` exists and remove what the previous run wrote there.
///
/// The previous run is known from `dir/<index>`: every `<slug>.json` it lists
/// is removed, then the index itself. Without a readable index only the index
/// file is removed. Returns the number of files removed.
pub fn clear_previous_run(dir: &Path, index: &str) -> Result<usize> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let index_path = dir.join(index);
    let Ok(content) = fs::read_to_string(&index_path) else {
        return Ok(0);
    };
    let entries: Vec<IndexEntry> = serde_json::from_str(&content).unwrap_or_default();

    let mut removed = 0;
    for name in entries.iter().filter_map(|entry| document_file(&entry.slug)) {
        let path = dir.join(name);
        if path.is_file() {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
            removed += 1;
        }
    }

    fs::remove_file(&index_path)
        .with_context(|| format!("failed to remove {}", index_path.display()))?;
    Ok(removed + 1)
}
