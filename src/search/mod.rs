//! Search Console
//!
//! Live fuzzy search over a fetched [`DirectorySnapshot`]. The editor and the
//! renderer are plain functions; [`run_console`] owns the terminal and feeds
//! key presses through them.
//!
//! [`DirectorySnapshot`]: crate::directory::DirectorySnapshot

mod console;
mod editor;
mod errors;
mod matcher;
mod render;

pub use console::*;
pub use editor::*;
pub use errors::*;
pub use matcher::*;
pub use render::*;
