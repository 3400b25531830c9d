//! Bearer tokens and token endpoint payloads.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Opaque bearer credential, held for the lifetime of the process only.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    value: String,
}

impl BearerToken {
    /// Wrap a raw access token.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Raw token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// `Authorization` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(**redacted**)")?;
        Ok(())
    }
}

impl Drop for BearerToken {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

/// Result of a broker run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome {
    /// A token was negotiated and returned to the caller.
    Bearer(BearerToken),

    /// The implicit flow delivered the token to the browser page only.
    BrowserDisplayed,
}

impl TokenOutcome {
    /// Token, when the flow returned one.
    #[must_use]
    pub fn into_bearer(self) -> Option<BearerToken> {
        match self {
            Self::Bearer(token) => Some(token),
            Self::BrowserDisplayed => None,
        }
    }
}

/// `client_credentials` request body.
#[derive(Debug, Serialize)]
pub(crate) struct ClientCredentialsRequest<'a> {
    pub grant_type: &'static str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub audience: &'a str,
}

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,

    #[serde(default)]
    pub scope: Option<String>,

    #[serde(default)]
    pub expires_in: Option<u64>,

    #[serde(default)]
    pub token_type: Option<String>,
}

/// Error payload returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderErrorBody {
    /// Machine readable error code, e.g. `access_denied`.
    #[serde(default)]
    pub error: String,

    /// Human readable explanation.
    #[serde(default, alias = "errorDescription")]
    pub error_description: String,
}

impl ProviderErrorBody {
    /// Decode a provider error body, keeping the raw text when it is not the
    /// expected JSON shape.
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_else(|_| Self {
            error: "unknown_error".to_string(),
            error_description: body.trim().to_string(),
        })
    }
}

impl fmt::Display for ProviderErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.error_description.is_empty() {
            write!(f, "{}", self.error)
        } else {
            write!(f, "{}: {}", self.error, self.error_description)
        }
    }
}
