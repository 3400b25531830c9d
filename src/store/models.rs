//! Credential Store Models

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of application registered against a tenant.
///
/// The serialized labels match the names the identity provider shows in its
/// dashboard, so records written by older versions of the tool still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientType {
    /// Confidential service talking to an API with its own credentials.
    #[serde(rename = "Machine-to-Machine Application")]
    MachineToMachine,

    /// Public client on a device; uses authorization code with PKCE.
    #[serde(rename = "Native Application")]
    Native,

    /// Confidential web server; uses authorization code with its secret.
    #[serde(rename = "Web Service Application")]
    WebService,

    /// Browser application; uses the implicit flow.
    #[serde(rename = "Single-Page Application (SPA)")]
    SinglePage,
}

impl ClientType {
    /// Every supported client type, in prompt order.
    pub const ALL: [Self; 4] = [
        Self::WebService,
        Self::Native,
        Self::SinglePage,
        Self::MachineToMachine,
    ];

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MachineToMachine => "Machine-to-Machine Application",
            Self::Native => "Native Application",
            Self::WebService => "Web Service Application",
            Self::SinglePage => "Single-Page Application (SPA)",
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An audience exposed by a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDescriptor {
    /// Display name used in prompts.
    pub name: String,

    /// Audience identifier sent to the token endpoint.
    pub audience: String,
}

/// Locally stored application record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    /// Client display name; also the store key (lowercased).
    pub name: String,

    /// OAuth2 client identifier.
    pub client_id: String,

    /// OAuth2 client secret. Empty for public clients.
    #[serde(default)]
    pub client_secret: String,

    /// Application kind, selects the token flow.
    pub client_type: ClientType,

    /// Name of the owning tenant.
    pub tenant_name: String,

    /// Audience preferred when requesting tokens for this client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
}

impl fmt::Debug for ClientProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientProfile")
            .field("name", &self.name)
            .field("client_id", &self.client_id)
            .field("client_secret", &"**redacted**")
            .field("client_type", &self.client_type)
            .field("tenant_name", &self.tenant_name)
            .field("audience", &self.audience)
            .finish()
    }
}

/// Locally stored identity-provider tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantProfile {
    /// Tenant display name; also the store key (lowercased).
    pub name: String,

    /// Tenant domain, e.g. `acme.eu.auth0.com`.
    pub domain: String,

    /// APIs the tenant exposes.
    #[serde(default)]
    pub apis: Vec<ApiDescriptor>,

    /// Client used by default for management calls against this tenant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_client: Option<ClientProfile>,
}

impl TenantProfile {
    /// Base URL for provider endpoints.
    ///
    /// Bare domains are addressed over HTTPS; a domain that already carries a
    /// scheme is used as-is, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        let domain = self.domain.trim().trim_end_matches('/');

        if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        }
    }

    /// API names, in configuration order.
    #[must_use]
    pub fn api_names(&self) -> Vec<String> {
        self.apis.iter().map(|api| api.name.clone()).collect()
    }

    /// Find a configured API by audience.
    #[must_use]
    pub fn api_by_audience(&self, audience: &str) -> Option<&ApiDescriptor> {
        self.apis.iter().find(|api| api.audience == audience)
    }
}
