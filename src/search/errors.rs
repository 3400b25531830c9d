//! Search console errors.

use std::io;

use thiserror::Error;

/// Search console failures.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Setting up, drawing to or reading from the terminal failed.
    #[error("terminal error")]
    Terminal(#[from] io::Error),
}
