//! System browser launching.

use std::io;

use mockall::automock;

/// Opens the authorization URL for the operator.
#[automock]
pub trait BrowserLauncher: Send + Sync {
    /// Navigate the operator's browser to `url`.
    ///
    /// # Errors
    ///
    /// Returns the launch failure.
    fn launch(&self, url: &str) -> io::Result<()>;
}

/// Launches the platform's default browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn launch(&self, url: &str) -> io::Result<()> {
        open::that(url)
    }
}
