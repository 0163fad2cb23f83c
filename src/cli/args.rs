//! Command-line interface definitions.

use crate::config::Section;
use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Portfolio content pipeline: feed and notebook ingestion, page rendering
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: folio.toml)
    #[arg(short = 'C', long, global = true, default_value = "folio.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Fetch the RSS/Atom feed and write post JSON
    #[command(visible_alias = "f")]
    Feed {
        /// Feed URL (overrides `feed.url`)
        #[arg(long, value_hint = clap::ValueHint::Url)]
        url: Option<String>,

        /// Output directory (relative to project root)
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        output: Option<PathBuf>,
    },

    /// Convert notebooks into JSON
    #[command(visible_alias = "n")]
    Notebooks {
        /// Notebook directory (overrides `notebooks.source`)
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        source: Option<PathBuf>,

        /// Output directory (relative to project root)
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        output: Option<PathBuf>,
    },

    /// Run both ingesters
    #[command(visible_alias = "b")]
    Build,

    /// Render one document to HTML
    #[command(visible_alias = "r")]
    Render {
        /// Section the document belongs to
        #[arg(value_enum)]
        section: Section,

        /// Document slug
        slug: Option<String>,

        /// Page query string to take the slug from, e.g. `slug=intro`
        #[arg(short, long, conflicts_with = "slug")]
        query: Option<String>,

        /// Write HTML to this file instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from(["folio", "-v", "render", "notebooks", "intro"]).unwrap();
        assert!(cli.verbose);
        let Commands::Render { section, slug, .. } = cli.command else {
            panic!("expected render");
        };
        assert_eq!(section, Section::Notebooks);
        assert_eq!(slug.as_deref(), Some("intro"));
    }

    #[test]
    fn test_slug_and_query_conflict() {
        assert!(Cli::try_parse_from(["folio", "r", "blog", "a", "--query", "slug=b"]).is_err());
    }

    #[test]
    fn test_aliases_and_overrides() {
        let cli = Cli::try_parse_from(["folio", "f", "--url", "https://x.dev/feed", "-o", "out"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Feed { url: Some(_), output: Some(_) }
        ));
        assert_eq!(cli.config, PathBuf::from("folio.toml"));
    }
}
