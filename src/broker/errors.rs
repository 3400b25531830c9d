//! Token broker errors.

use std::{io, time::Duration};

use thiserror::Error;

use crate::{broker::ProviderErrorBody, prompt::PromptError};

/// Errors raised while negotiating a bearer token.
///
/// None of these are retried: a token request carries secrets and an
/// authorization code is single-use.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Machine-to-machine token requested for a tenant without APIs.
    #[error(
        "tenant {tenant} has no APIs configured; add one with `authtool tenant update {tenant}` \
         before requesting a machine-to-machine token"
    )]
    MissingAudience {
        /// Tenant name.
        tenant: String,
    },

    /// The operator could not pick an audience.
    #[error("audience selection failed")]
    AudienceSelection(#[source] PromptError),

    /// Selected audience index is outside the tenant's API list.
    #[error("audience selection {0} is out of range")]
    AudienceOutOfRange(usize),

    /// Token endpoint answered with a non-success status.
    #[error("token endpoint returned status {status}: {body}")]
    ProviderToken {
        /// HTTP status code.
        status: u16,

        /// Decoded provider error payload.
        body: ProviderErrorBody,
    },

    /// The redirect listener could not bind its port.
    #[error("can't listen on port {port}")]
    ListenerBind {
        /// Requested port.
        port: u16,

        /// Bind failure.
        #[source]
        source: io::Error,
    },

    /// The system browser could not be opened.
    #[error("can't open browser to URL {url}")]
    BrowserLaunch {
        /// Authorization URL.
        url: String,

        /// Launch failure.
        #[source]
        source: io::Error,
    },

    /// The redirect arrived without an authorization code.
    #[error("callback is missing the 'code' parameter{}", provider_reason(.error, .description))]
    CallbackMissingCode {
        /// `error` query parameter sent by the provider, if any.
        error: Option<String>,

        /// `error_description` query parameter sent by the provider, if any.
        description: Option<String>,
    },

    /// No redirect arrived before the deadline.
    #[error("timed out after {0:?} waiting for the browser redirect")]
    CallbackTimeout(Duration),

    /// Operator cancelled the wait for the redirect.
    #[error("cancelled while waiting for the browser redirect")]
    CallbackCancelled,

    /// The callback server stopped before producing a result.
    #[error("callback listener failed")]
    Listener(#[source] io::Error),

    /// Token endpoint response could not be decoded.
    #[error("token response could not be decoded: {0}")]
    TokenDecode(String),

    /// The authorization URL could not be built.
    #[error("invalid authorization URL")]
    AuthorizationUrl(#[from] url::ParseError),

    /// HTTP transport failure.
    #[error("http error")]
    Transport(#[from] reqwest::Error),
}

fn provider_reason(error: &Option<String>, description: &Option<String>) -> String {
    match (error, description) {
        (Some(error), Some(description)) => format!(" ({error}: {description})"),
        (Some(error), None) => format!(" ({error})"),
        (None, Some(description)) => format!(" ({description})"),
        (None, None) => String::new(),
    }
}
