//! Credential store errors.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Credential store error variants.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Config directory could not be resolved or created.
    #[error("config directory {path} is unusable")]
    ConfigDir {
        /// Offending path.
        path: PathBuf,

        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Config path exists but is not a directory.
    #[error("config path {0} is not a directory")]
    NotADirectory(PathBuf),

    /// Reading or writing a store file failed.
    #[error("failed to access {path}")]
    Io {
        /// Store file path.
        path: PathBuf,

        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Store file contents are not valid YAML for the expected shape.
    #[error("failed to parse {path}")]
    Parse {
        /// Store file path.
        path: PathBuf,

        /// Underlying YAML error.
        #[source]
        source: serde_norway::Error,
    },

    /// Serializing the store failed.
    #[error("failed to serialize store")]
    Serialize(#[source] serde_norway::Error),

    /// Tenant was not found.
    #[error("tenant {0} not found")]
    TenantNotFound(String),

    /// Client was not found.
    #[error("client {0} not found")]
    ClientNotFound(String),

    /// A record with the same name already exists.
    #[error("{0} already exists")]
    AlreadyExists(String),
}
