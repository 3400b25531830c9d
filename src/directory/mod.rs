//! Directory Fetcher
//!
//! Pages through the management API's client listing and assembles an
//! ordered, read-only [`DirectorySnapshot`]. Each page request is retried
//! under a bounded [`RetryPolicy`]; any page that ultimately fails aborts the
//! whole fetch.

mod client;
mod errors;
mod fetcher;
mod models;
mod retry;

pub use client::*;
pub use errors::*;
pub use fetcher::*;
pub use models::*;
pub use retry::*;
