//! Site configuration management for `folio.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── site       # [site]
//! │   ├── feed       # [feed]
//! │   ├── notebooks  # [notebooks]
//! │   └── render     # [render]
//! ├── error          # ConfigError
//! ├── util           # config discovery, URL checks
//! └── mod.rs         # FolioConfig (this file)
//! ```
//!
//! The config file is optional: without one every section falls back to its
//! defaults and the directory the command runs in becomes the root.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{
    FeedSectionConfig, NotebooksSectionConfig, RenderSectionConfig, SiteSectionConfig,
};

use crate::{
    cli::{Cli, Commands},
    debug, log,
};
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::find_config_file;

/// Directory name under a section holding the generated JSON.
pub const RENDERED_DIR: &str = "_rendered";

/// Content sections the pipeline publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Section {
    /// Posts ingested from the feed.
    Blog,
    /// Rendered Jupyter notebooks.
    Notebooks,
}

/// Output directory overrides given on the command line.
#[derive(Debug, Clone, Default)]
pub struct OutputOverrides {
    pub feed: Option<PathBuf>,
    pub notebooks: Option<PathBuf>,
    pub notebooks_source: Option<PathBuf>,
}

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing folio.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolioConfig {
    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// CLI path overrides (internal use only)
    #[serde(skip)]
    pub overrides: OutputOverrides,

    #[serde(default)]
    pub site: SiteSectionConfig,

    #[serde(default)]
    pub feed: FeedSectionConfig,

    #[serde(default)]
    pub notebooks: NotebooksSectionConfig,

    #[serde(default)]
    pub render: RenderSectionConfig,
}

impl FolioConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when no config file exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config, &cwd) {
            Some(path) => {
                debug!("config"; "using {}", path.display());
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self {
                    root: cwd,
                    ..Self::default()
                }
            }
        };

        config.apply_command_options(cli);
        config.validate()?;
        Ok(config)
    }

    /// Apply command-specific CLI overrides.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Feed { url, output } => {
                if let Some(url) = url {
                    self.feed.url.clone_from(url);
                }
                self.overrides.feed.clone_from(output);
            }
            Commands::Notebooks { source, output } => {
                self.overrides.notebooks_source.clone_from(source);
                self.overrides.notebooks.clone_from(output);
            }
            Commands::Build | Commands::Render { .. } => {}
        }
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            let display_path = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            log!("warn"; "ignoring unknown fields in {}: {}", display_path, ignored.join(", "));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    /// Check values the ingesters rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, name) in [
            ("feed.section", &self.feed.section),
            ("notebooks.section", &self.notebooks.section),
        ] {
            if crate::render::validate_slug(name).is_none() {
                return Err(ConfigError::Validation(format!(
                    "`{field}` must match [a-zA-Z0-9_-]+, got `{name}`"
                )));
            }
        }
        let posts_dir = self.rendered_dir(Section::Blog);
        if posts_dir == self.rendered_dir(Section::Notebooks) {
            return Err(ConfigError::Validation(format!(
                "posts and notebooks cannot share the output directory {}",
                posts_dir.display()
            )));
        }
        if self.feed.words_per_minute == 0 {
            return Err(ConfigError::Validation(
                "`feed.words_per_minute` must be greater than 0".into(),
            ));
        }
        if self.feed.timeout == 0 {
            return Err(ConfigError::Validation(
                "`feed.timeout` must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Directory served as the site origin.
    pub fn public_dir(&self) -> PathBuf {
        self.root_join(&self.site.public)
    }

    /// Directory name of a section under the public dir.
    pub fn section_name(&self, section: Section) -> &str {
        match section {
            Section::Blog => &self.feed.section,
            Section::Notebooks => &self.notebooks.section,
        }
    }

    /// `<public>/<section>/_rendered`, unless overridden on the command line.
    pub fn rendered_dir(&self, section: Section) -> PathBuf {
        let override_dir = match section {
            Section::Blog => &self.overrides.feed,
            Section::Notebooks => &self.overrides.notebooks,
        };
        match override_dir {
            Some(dir) => self.root_join(dir),
            None => self
                .public_dir()
                .join(self.section_name(section))
                .join(RENDERED_DIR),
        }
    }

    /// Listing page a rejected slug redirects to: `/<section>/`.
    pub fn listing_url(&self, section: Section) -> String {
        format!("/{}/", self.section_name(section))
    }

    /// Directory scanned for notebooks.
    pub fn notebooks_source(&self) -> PathBuf {
        let source = self
            .overrides
            .notebooks_source
            .as_ref()
            .unwrap_or(&self.notebooks.source);
        self.root_join(source)
    }
}

/// Parse a test config, failing on unknown fields.
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> FolioConfig {
    let (parsed, ignored) = FolioConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
