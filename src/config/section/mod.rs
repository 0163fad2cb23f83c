//! Configuration section definitions.
//!
//! Each module corresponds to a section in `folio.toml`:
//!
//! | Module      | TOML Section    | Purpose                                  |
//! |-------------|-----------------|------------------------------------------|
//! | `site`      | `[site]`        | Public site root the sections live in    |
//! | `feed`      | `[feed]`        | Feed URL, transport limits, post output  |
//! | `notebooks` | `[notebooks]`   | Notebook source dir and output section   |
//! | `render`    | `[render]`      | Page rendering defaults                  |

mod feed;
mod notebooks;
mod render;
mod site;

pub use feed::FeedSectionConfig;
pub use notebooks::NotebooksSectionConfig;
pub use render::RenderSectionConfig;
pub use site::SiteSectionConfig;
