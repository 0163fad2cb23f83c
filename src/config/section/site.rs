//! `[site]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [site]
//! public = "public"       # Static site root (relative to the config file)
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSectionConfig {
    /// Directory served as the site origin. Sections are subdirectories of it.
    pub public: PathBuf,
}

impl Default for SiteSectionConfig {
    fn default() -> Self {
        Self {
            public: "public".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.site.public, PathBuf::from("public"));
    }

    #[test]
    fn test_custom_public() {
        let config = test_parse_config("[site]\npublic = \"dist\"");
        assert_eq!(config.site.public, PathBuf::from("dist"));
    }
}
