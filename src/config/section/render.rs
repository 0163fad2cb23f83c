//! `[render]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [render]
//! code_language = "python"    # Language class when a notebook declares none
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSectionConfig {
    /// Fallback `language-*` class for code cells.
    pub code_language: String,
}

impl Default for RenderSectionConfig {
    fn default() -> Self {
        Self {
            code_language: "python".into(),
        }
    }
}
