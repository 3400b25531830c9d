//! Token broker.

use std::{fmt, future::Future, sync::Arc, time::Duration};

use reqwest::Client;
use tracing::{debug, info};

use crate::{
    broker::{
        AudienceSelector, BrokerError, BrowserFlow, BrowserLauncher, CallbackListener,
        TokenOutcome, authorization_url, client_credentials, exchange_code,
    },
    store::{ClientProfile, TenantProfile},
};

/// Port the loopback redirect listener binds by default.
pub const DEFAULT_REDIRECT_PORT: u16 = 1000;

/// How long to wait for the browser redirect by default.
pub const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Broker tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerSettings {
    /// Redirect listener port; `0` binds any free port.
    pub redirect_port: u16,

    /// Deadline for the browser redirect.
    pub callback_timeout: Duration,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            redirect_port: DEFAULT_REDIRECT_PORT,
            callback_timeout: DEFAULT_CALLBACK_TIMEOUT,
        }
    }
}

/// Progress of an authorization-code negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Nothing started.
    Idle,
    /// Redirect listener holds its port.
    ListenerBound,
    /// Browser was pointed at the authorization URL.
    BrowserLaunched,
    /// Blocked on the redirect.
    AwaitingCallback,
    /// Redirect carried a code.
    CodeReceived,
    /// Redirect carried no code.
    CallbackError,
    /// Code was traded for a token.
    TokenExchanged,
    /// Flow finished.
    Done,
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug)]
struct FlowTrace {
    state: FlowState,
}

impl FlowTrace {
    const fn new() -> Self {
        Self {
            state: FlowState::Idle,
        }
    }

    fn advance(&mut self, next: FlowState) {
        debug!(from = %self.state, to = %next, "token flow transition");
        self.state = next;
    }
}

/// Negotiates bearer tokens for stored clients.
///
/// The variant is picked from the client type: machine-to-machine clients use
/// `client_credentials`, native apps the authorization code with PKCE, web
/// services the authorization code with their secret and single-page apps the
/// implicit flow.
#[derive(Clone)]
pub struct TokenBroker {
    http: Client,
    settings: BrokerSettings,
    browser: Arc<dyn BrowserLauncher>,
    audiences: Arc<dyn AudienceSelector>,
}

impl fmt::Debug for TokenBroker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBroker")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TokenBroker {
    /// Create a broker with its own HTTP client.
    #[must_use]
    pub fn new(
        settings: BrokerSettings,
        browser: Arc<dyn BrowserLauncher>,
        audiences: Arc<dyn AudienceSelector>,
    ) -> Self {
        Self::with_http_client(Client::new(), settings, browser, audiences)
    }

    /// Create a broker sharing an existing HTTP client.
    #[must_use]
    pub fn with_http_client(
        http: Client,
        settings: BrokerSettings,
        browser: Arc<dyn BrowserLauncher>,
        audiences: Arc<dyn AudienceSelector>,
    ) -> Self {
        Self {
            http,
            settings,
            browser,
            audiences,
        }
    }

    /// Negotiate a token for `client`, which belongs to `tenant`.
    ///
    /// Browser flows can be cancelled with Ctrl-C while waiting for the
    /// redirect.
    ///
    /// # Errors
    ///
    /// Returns any [`BrokerError`]; none are retried.
    pub async fn acquire(
        &self,
        client: &ClientProfile,
        tenant: &TenantProfile,
    ) -> Result<TokenOutcome, BrokerError> {
        self.acquire_with_cancel(client, tenant, ctrl_c()).await
    }

    /// [`TokenBroker::acquire`] with an explicit cancel signal for the
    /// redirect wait.
    ///
    /// # Errors
    ///
    /// Returns any [`BrokerError`]; none are retried.
    pub async fn acquire_with_cancel<F>(
        &self,
        client: &ClientProfile,
        tenant: &TenantProfile,
        cancel: F,
    ) -> Result<TokenOutcome, BrokerError>
    where
        F: Future<Output = ()>,
    {
        match BrowserFlow::for_client_type(client.client_type) {
            None => {
                let audience = self.required_audience(client, tenant)?;

                client_credentials::request_token(&self.http, tenant, client, &audience)
                    .await
                    .map(TokenOutcome::Bearer)
            }
            Some(flow) => self.browser_flow(client, tenant, flow, cancel).await,
        }
    }

    async fn browser_flow<F>(
        &self,
        client: &ClientProfile,
        tenant: &TenantProfile,
        flow: BrowserFlow,
        cancel: F,
    ) -> Result<TokenOutcome, BrokerError>
    where
        F: Future<Output = ()>,
    {
        let audience = self.optional_audience(client, tenant)?;
        let mut trace = FlowTrace::new();

        let listener = CallbackListener::bind(self.settings.redirect_port).await?;
        trace.advance(FlowState::ListenerBound);

        let redirect_uri = listener.redirect_uri();
        let url = authorization_url(tenant, client, audience.as_deref(), &redirect_uri, &flow)?;

        if let Err(source) = self.browser.launch(url.as_str()) {
            drop(listener);

            return Err(BrokerError::BrowserLaunch {
                url: url.into(),
                source,
            });
        }
        trace.advance(FlowState::BrowserLaunched);

        info!(client = %client.name, %redirect_uri, "complete the login in your browser");

        trace.advance(FlowState::AwaitingCallback);
        let params = listener
            .wait(flow.callback_mode(), self.settings.callback_timeout, cancel)
            .await?;

        if !flow.exchanges_code() {
            trace.advance(FlowState::Done);
            info!("token delivered to the browser page");

            return Ok(TokenOutcome::BrowserDisplayed);
        }

        let code = params.into_code().inspect_err(|_| {
            trace.advance(FlowState::CallbackError);
        })?;
        trace.advance(FlowState::CodeReceived);

        let token = exchange_code(&self.http, tenant, client, &flow, &code, &redirect_uri).await?;
        trace.advance(FlowState::TokenExchanged);
        trace.advance(FlowState::Done);

        Ok(TokenOutcome::Bearer(token))
    }

    fn required_audience(
        &self,
        client: &ClientProfile,
        tenant: &TenantProfile,
    ) -> Result<String, BrokerError> {
        if tenant.apis.is_empty() {
            return Err(BrokerError::MissingAudience {
                tenant: tenant.name.clone(),
            });
        }

        if let Some(audience) = client.audience.as_deref()
            && tenant.api_by_audience(audience).is_some()
        {
            return Ok(audience.to_string());
        }

        self.select_audience(tenant)
    }

    fn optional_audience(
        &self,
        client: &ClientProfile,
        tenant: &TenantProfile,
    ) -> Result<Option<String>, BrokerError> {
        if let Some(audience) = &client.audience {
            return Ok(Some(audience.clone()));
        }

        if tenant.apis.is_empty() {
            return Ok(None);
        }

        self.select_audience(tenant).map(Some)
    }

    fn select_audience(&self, tenant: &TenantProfile) -> Result<String, BrokerError> {
        let index = self
            .audiences
            .select_audience(tenant)
            .map_err(BrokerError::AudienceSelection)?;

        tenant
            .apis
            .get(index)
            .map(|api| api.audience.clone())
            .ok_or(BrokerError::AudienceOutOfRange(index))
    }
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use std::future::pending;

    use testresult::TestResult;

    use super::*;
    use crate::{
        broker::{MockAudienceSelector, MockBrowserLauncher},
        store::{ApiDescriptor, ClientType},
    };

    fn tenant(apis: Vec<ApiDescriptor>) -> TenantProfile {
        TenantProfile {
            name: "t1".to_string(),
            domain: "http://127.0.0.1:9".to_string(),
            apis,
            default_client: None,
        }
    }

    fn client(client_type: ClientType, audience: Option<&str>) -> ClientProfile {
        ClientProfile {
            name: "c1".to_string(),
            client_id: "c1-id".to_string(),
            client_secret: "c1-secret".to_string(),
            client_type,
            tenant_name: "t1".to_string(),
            audience: audience.map(ToString::to_string),
        }
    }

    fn api(audience: &str) -> ApiDescriptor {
        ApiDescriptor {
            name: audience.to_string(),
            audience: audience.to_string(),
        }
    }

    fn broker(browser: MockBrowserLauncher, audiences: MockAudienceSelector) -> TokenBroker {
        TokenBroker::new(
            BrokerSettings {
                redirect_port: 0,
                callback_timeout: Duration::from_secs(5),
            },
            Arc::new(browser),
            Arc::new(audiences),
        )
    }

    #[tokio::test]
    async fn machine_to_machine_without_apis_is_missing_audience() {
        let broker = broker(MockBrowserLauncher::new(), MockAudienceSelector::new());

        let result = broker
            .acquire_with_cancel(
                &client(ClientType::MachineToMachine, None),
                &tenant(Vec::new()),
                pending(),
            )
            .await;

        assert!(
            matches!(result, Err(BrokerError::MissingAudience { .. })),
            "expected MissingAudience, got {result:?}"
        );
    }

    #[test]
    fn configured_client_audience_skips_prompt() -> TestResult {
        let broker = broker(MockBrowserLauncher::new(), MockAudienceSelector::new());

        let audience = broker.required_audience(
            &client(ClientType::MachineToMachine, Some("aud2")),
            &tenant(vec![api("aud1"), api("aud2")]),
        )?;

        assert_eq!(audience, "aud2");

        Ok(())
    }

    #[test]
    fn unknown_client_audience_falls_back_to_prompt() -> TestResult {
        let mut audiences = MockAudienceSelector::new();
        audiences.expect_select_audience().times(1).returning(|_| Ok(0));

        let broker = broker(MockBrowserLauncher::new(), audiences);

        let audience = broker.required_audience(
            &client(ClientType::MachineToMachine, Some("stale")),
            &tenant(vec![api("aud1")]),
        )?;

        assert_eq!(audience, "aud1");

        Ok(())
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let mut audiences = MockAudienceSelector::new();
        audiences.expect_select_audience().returning(|_| Ok(7));

        let broker = broker(MockBrowserLauncher::new(), audiences);

        let result = broker.select_audience(&tenant(vec![api("aud1")]));

        assert!(
            matches!(result, Err(BrokerError::AudienceOutOfRange(7))),
            "expected AudienceOutOfRange, got {result:?}"
        );
    }

    #[test]
    fn browser_flow_without_apis_omits_audience() -> TestResult {
        let broker = broker(MockBrowserLauncher::new(), MockAudienceSelector::new());

        let audience =
            broker.optional_audience(&client(ClientType::Native, None), &tenant(Vec::new()))?;

        assert_eq!(audience, None);

        Ok(())
    }

    #[tokio::test]
    async fn browser_launch_failure_is_reported() {
        let mut browser = MockBrowserLauncher::new();
        browser
            .expect_launch()
            .times(1)
            .returning(|_| Err(std::io::Error::other("no display")));

        let broker = broker(browser, MockAudienceSelector::new());

        let result = broker
            .acquire_with_cancel(
                &client(ClientType::WebService, None),
                &tenant(Vec::new()),
                pending(),
            )
            .await;

        assert!(
            matches!(result, Err(BrokerError::BrowserLaunch { .. })),
            "expected BrowserLaunch, got {result:?}"
        );
    }
}
