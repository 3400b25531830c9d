//! Authorization-code and implicit browser flows.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::{
    broker::{
        AUTHORIZE_PATH, BearerToken, BrokerError, CODE_CHALLENGE_METHOD, CallbackMode,
        CodeVerifier, ProviderErrorBody, TOKEN_PATH,
    },
    store::{ClientProfile, ClientType, TenantProfile},
};

/// Scope requested by the code flows so a refresh token is issued.
pub const OFFLINE_ACCESS_SCOPE: &str = "offline_access";

/// Loopback redirect URI for the given listener port.
#[must_use]
pub fn redirect_uri(port: u16) -> String {
    format!("http://localhost:{port}")
}

/// Browser-based negotiation variant, selected by client type.
#[derive(Debug)]
pub enum BrowserFlow {
    /// Authorization code bound to a PKCE verifier (native apps).
    Pkce(CodeVerifier),

    /// Authorization code exchanged with the client secret (web services).
    WebService,

    /// Implicit flow; the token only reaches the browser (single-page apps).
    Implicit,
}

impl BrowserFlow {
    /// Flow for `client_type`, or `None` for machine-to-machine clients which
    /// never involve a browser.
    #[must_use]
    pub fn for_client_type(client_type: ClientType) -> Option<Self> {
        match client_type {
            ClientType::MachineToMachine => None,
            ClientType::Native => Some(Self::Pkce(CodeVerifier::generate())),
            ClientType::WebService => Some(Self::WebService),
            ClientType::SinglePage => Some(Self::Implicit),
        }
    }

    /// Whether the redirect carries a code that must be exchanged.
    #[must_use]
    pub const fn exchanges_code(&self) -> bool {
        !matches!(self, Self::Implicit)
    }

    /// How the redirect listener should treat the callback.
    #[must_use]
    pub const fn callback_mode(&self) -> CallbackMode {
        if self.exchanges_code() {
            CallbackMode::AuthorizationCode
        } else {
            CallbackMode::Implicit
        }
    }

    fn authorization_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Pkce(verifier) => vec![
                ("code_challenge", verifier.challenge()),
                ("code_challenge_method", CODE_CHALLENGE_METHOD.to_string()),
                ("scope", OFFLINE_ACCESS_SCOPE.to_string()),
                ("response_type", "code".to_string()),
            ],
            Self::WebService => vec![
                ("scope", OFFLINE_ACCESS_SCOPE.to_string()),
                ("response_type", "code".to_string()),
            ],
            Self::Implicit => vec![("response_type", "token".to_string())],
        }
    }
}

/// Build the `/authorize` URL the operator's browser is sent to.
///
/// # Errors
///
/// Returns [`BrokerError::AuthorizationUrl`] when the tenant domain does not
/// form a valid URL.
pub fn authorization_url(
    tenant: &TenantProfile,
    client: &ClientProfile,
    audience: Option<&str>,
    redirect_uri: &str,
    flow: &BrowserFlow,
) -> Result<Url, BrokerError> {
    let mut url = Url::parse(&format!("{}{AUTHORIZE_PATH}", tenant.base_url()))?;

    {
        let mut query = url.query_pairs_mut();

        if let Some(audience) = audience {
            query.append_pair("audience", audience);
        }

        query
            .append_pair("client_id", &client.client_id)
            .append_pair("redirect_uri", redirect_uri);

        for (key, value) in flow.authorization_params() {
            query.append_pair(key, &value);
        }
    }

    Ok(url)
}

/// Trade an authorization code for an access token.
///
/// The code is single-use, so this is attempted exactly once.
///
/// # Errors
///
/// Returns [`BrokerError::ProviderToken`] for a non-success status and
/// [`BrokerError::TokenDecode`] when `access_token` is missing or not a
/// string.
pub async fn exchange_code(
    http: &Client,
    tenant: &TenantProfile,
    client: &ClientProfile,
    flow: &BrowserFlow,
    code: &str,
    redirect_uri: &str,
) -> Result<BearerToken, BrokerError> {
    let url = format!("{}{TOKEN_PATH}", tenant.base_url());

    let mut form = vec![
        ("grant_type", "authorization_code"),
        ("client_id", client.client_id.as_str()),
        ("code", code),
        ("redirect_uri", redirect_uri),
    ];

    match flow {
        BrowserFlow::Pkce(verifier) => form.push(("code_verifier", verifier.as_str())),
        BrowserFlow::WebService => form.push(("client_secret", client.client_secret.as_str())),
        BrowserFlow::Implicit => {}
    }

    info!(client = %client.name, "exchanging authorization code");

    let response = http.post(&url).form(&form).send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(BrokerError::ProviderToken {
            status: status.as_u16(),
            body: ProviderErrorBody::from_body(&text),
        });
    }

    let body: Value =
        serde_json::from_str(&text).map_err(|error| BrokerError::TokenDecode(error.to_string()))?;

    let access_token = body
        .get("access_token")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            BrokerError::TokenDecode("access_token is missing or not a string".to_string())
        })?;

    debug!(expires_in = ?body.get("expires_in"), "authorization code exchanged");

    Ok(BearerToken::new(access_token))
}
