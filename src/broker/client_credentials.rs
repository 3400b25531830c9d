//! `client_credentials` grant for machine-to-machine clients.

use reqwest::Client;
use tracing::{debug, info};

use crate::{
    broker::{
        BearerToken, BrokerError, ClientCredentialsRequest, ProviderErrorBody, TokenResponse,
        TOKEN_PATH,
    },
    store::{ClientProfile, TenantProfile},
};

const GRANT_TYPE: &str = "client_credentials";

/// Request a token for `client` against `audience`.
///
/// One POST, no retry. A non-success status is decoded into a
/// [`ProviderErrorBody`].
///
/// # Errors
///
/// Returns [`BrokerError::ProviderToken`] for a non-success status,
/// [`BrokerError::TokenDecode`] for an unreadable success body and
/// [`BrokerError::Transport`] when the request cannot be sent.
pub async fn request_token(
    http: &Client,
    tenant: &TenantProfile,
    client: &ClientProfile,
    audience: &str,
) -> Result<BearerToken, BrokerError> {
    let url = format!("{}{TOKEN_PATH}", tenant.base_url());

    info!(client = %client.name, %audience, "requesting client credentials token");

    let response = http
        .post(&url)
        .json(&ClientCredentialsRequest {
            grant_type: GRANT_TYPE,
            client_id: &client.client_id,
            client_secret: &client.client_secret,
            audience,
        })
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(BrokerError::ProviderToken {
            status: status.as_u16(),
            body: ProviderErrorBody::from_body(&text),
        });
    }

    let parsed: TokenResponse =
        serde_json::from_str(&text).map_err(|error| BrokerError::TokenDecode(error.to_string()))?;

    debug!(
        expires_in = ?parsed.expires_in,
        token_type = ?parsed.token_type,
        scope = ?parsed.scope,
        "client credentials token issued"
    );

    Ok(BearerToken::new(parsed.access_token))
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;
    use testresult::TestResult;

    use super::*;
    use crate::store::{ApiDescriptor, ClientType};

    fn fixtures(server: &MockServer) -> (TenantProfile, ClientProfile) {
        let tenant = TenantProfile {
            name: "t1".to_string(),
            domain: server.base_url(),
            apis: vec![ApiDescriptor {
                name: "api".to_string(),
                audience: "aud1".to_string(),
            }],
            default_client: None,
        };
        let client = ClientProfile {
            name: "c1".to_string(),
            client_id: "c1-id".to_string(),
            client_secret: "c1-secret".to_string(),
            client_type: ClientType::MachineToMachine,
            tenant_name: "t1".to_string(),
            audience: None,
        };

        (tenant, client)
    }

    #[tokio::test]
    async fn returns_access_token() -> TestResult {
        let server = MockServer::start();
        let (tenant, client) = fixtures(&server);

        let mock = server
            .mock(|when, then| {
                when.method(POST).path("/oauth/token").json_body(json!({
                    "grant_type": "client_credentials",
                    "client_id": "c1-id",
                    "client_secret": "c1-secret",
                    "audience": "aud1",
                }));
                then.status(200).json_body(json!({
                    "access_token": "abc",
                    "scope": "read:clients",
                    "expires_in": 3600,
                    "token_type": "Bearer",
                }));
            });

        let token = request_token(&Client::new(), &tenant, &client, "aud1").await?;

        assert_eq!(token.as_str(), "abc");
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn non_success_is_provider_error_without_retry() {
        let server = MockServer::start();
        let (tenant, client) = fixtures(&server);

        let mock = server
            .mock(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(403).json_body(json!({
                    "error": "access_denied",
                    "error_description": "Client is not authorized",
                }));
            });

        let result = request_token(&Client::new(), &tenant, &client, "aud1").await;

        assert!(
            matches!(
                &result,
                Err(BrokerError::ProviderToken { status: 403, body }) if body.error == "access_denied"
            ),
            "expected ProviderToken, got {result:?}"
        );
        assert_eq!(mock.calls(), 1, "token requests are never retried");
    }

    #[tokio::test]
    async fn missing_access_token_is_decode_error() -> TestResult {
        let server = MockServer::start();
        let (tenant, client) = fixtures(&server);

        server
            .mock(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(200).json_body(json!({ "expires_in": 3600 }));
            });

        let result = request_token(&Client::new(), &tenant, &client, "aud1").await;

        assert!(
            matches!(result, Err(BrokerError::TokenDecode(_))),
            "expected TokenDecode, got {result:?}"
        );

        Ok(())
    }
}
