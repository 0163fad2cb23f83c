//! Command-line interface module.

mod args;
pub mod ingest;
pub mod render;

pub use args::{Cli, Commands};
