//! Tool configuration.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Args;
use thiserror::Error;

use crate::{
    broker::{BrokerSettings, DEFAULT_REDIRECT_PORT},
    directory::DEFAULT_REQUEST_TIMEOUT,
};

/// Where records live unless told otherwise.
pub const DEFAULT_CONFIG_DIR: &str = "~/.authtool";

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `~` was used but the home directory is unknown.
    #[error("can't expand {0}: no home directory")]
    NoHomeDir(String),
}

/// Options shared by every command.
#[derive(Debug, Clone, Args)]
pub struct ToolConfig {
    /// Directory holding tenant and client records
    #[arg(long, env = "AUTHTOOL_CONFIG_DIR", default_value = DEFAULT_CONFIG_DIR, global = true)]
    pub config_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Loopback port for browser redirects; must match the client's allowed callback
    #[arg(long, env = "AUTHTOOL_REDIRECT_PORT", default_value_t = DEFAULT_REDIRECT_PORT, global = true)]
    pub redirect_port: u16,

    /// Seconds to wait for the browser redirect
    #[arg(long, default_value_t = 300, global = true)]
    pub callback_timeout_secs: u64,

    /// Seconds before a management API page request is abandoned and retried
    #[arg(long, env = "AUTHTOOL_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs(), global = true)]
    pub request_timeout_secs: u64,
}

impl ToolConfig {
    /// The config directory with `~` expanded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDir`] when `~` is used and no home
    /// directory is known.
    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        expand_home(&self.config_dir, dirs::home_dir().as_deref())
    }

    /// Token broker settings derived from the flags.
    #[must_use]
    pub fn broker_settings(&self) -> BrokerSettings {
        BrokerSettings {
            redirect_port: self.redirect_port,
            callback_timeout: Duration::from_secs(self.callback_timeout_secs),
        }
    }

    /// Per-request deadline for directory page fetches.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Replace a leading `~` in `path` with `home`.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDir`] when `path` starts with `~` and `home`
/// is `None`.
pub fn expand_home(path: &str, home: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let rest = if path == "~" {
        ""
    } else if let Some(rest) = path.strip_prefix("~/") {
        rest
    } else {
        return Ok(PathBuf::from(path));
    };

    let home = home.ok_or_else(|| ConfigError::NoHomeDir(path.to_string()))?;

    Ok(home.join(rest))
}
