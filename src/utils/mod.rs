//! Utility modules shared by the ingesters and the renderer.

pub mod date;
pub mod fs;
pub mod html;
pub mod plural;
pub mod slug;
