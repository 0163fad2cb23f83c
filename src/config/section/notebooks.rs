//! `[notebooks]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [notebooks]
//! source = "notebooks"        # Directory of .ipynb files (relative to the config file)
//! section = "notebooks"       # Output: <public>/notebooks/_rendered/
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotebooksSectionConfig {
    /// Directory scanned for `*.ipynb` files (not recursive).
    pub source: PathBuf,
    /// Site section the notebooks are published under.
    pub section: String,
}

impl Default for NotebooksSectionConfig {
    fn default() -> Self {
        Self {
            source: "notebooks".into(),
            section: "notebooks".into(),
        }
    }
}
