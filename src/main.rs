//! Folio - content pipeline for a portfolio site.
//!
//! Turns an RSS/Atom feed and a folder of Jupyter notebooks into sanitized
//! JSON, and renders single documents from that JSON.

mod cli;
mod config;
mod feed;
mod logger;
mod notebook;
mod render;
mod sanitize;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::FolioConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    // Configuration errors are the only ones that fail the process
    let config = FolioConfig::load(&cli)?;

    match &cli.command {
        Commands::Feed { .. } => {
            cli::ingest::run_feed(&config);
        }
        Commands::Notebooks { .. } => {
            cli::ingest::run_notebooks(&config);
        }
        Commands::Build => cli::ingest::run_build(&config),
        Commands::Render {
            section,
            slug,
            query,
            output,
        } => cli::render::run_render(
            &config,
            *section,
            slug.as_deref(),
            query.as_deref(),
            output.as_deref(),
        )?,
    }
    Ok(())
}
