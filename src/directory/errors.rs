//! Directory fetch errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error body returned by the management API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementApiError {
    #[serde(rename = "statusCode", default)]
    pub status_code: u16,

    #[serde(default)]
    pub error: String,

    #[serde(default)]
    pub message: String,

    #[serde(rename = "errorCode", default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl fmt::Display for ManagementApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Failures fetching the client directory, tagged with the page.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The request could not be sent or timed out.
    #[error("request for clients page {page} failed")]
    Transport {
        page: u32,

        #[source]
        source: reqwest::Error,
    },

    /// Non-200 status with a structured error body.
    #[error("management API returned status {status} for clients page {page}: {body}")]
    Api {
        page: u32,
        status: u16,
        body: ManagementApiError,
    },

    /// Non-200 status whose body is not the structured error shape.
    #[error("management API returned status {status} for clients page {page} with an unreadable body")]
    UnreadableError { page: u32, status: u16, body: String },

    /// A 200 body that is not a clients page.
    #[error("clients page {page} could not be decoded")]
    Decode {
        page: u32,

        #[source]
        source: serde_json::Error,
    },

    /// The retry policy ran out; `last` is the final failure.
    #[error("clients page {page} failed after {attempts} attempts")]
    RetriesExhausted {
        page: u32,
        attempts: u32,

        #[source]
        last: Box<DirectoryError>,
    },
}

impl DirectoryError {
    /// Whether another attempt at the same page may succeed.
    ///
    /// Rate limiting, server errors, transport failures and error bodies
    /// we cannot read are transient. Any other status the provider explains
    /// (401, 403, 404…) and an undecodable success body are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::UnreadableError { .. } => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Decode { .. } | Self::RetriesExhausted { .. } => false,
        }
    }
}
