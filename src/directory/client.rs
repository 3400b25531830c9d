//! Management API transport.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, StatusCode, header::AUTHORIZATION};
use tracing::debug;

use crate::{
    broker::BearerToken,
    directory::{ClientsPage, DirectoryError, ManagementApiError},
    store::TenantProfile,
};

/// Clients listing path, relative to the tenant base URL.
pub const CLIENTS_PATH: &str = "/api/v2/clients";

/// Deadline for one page request, connection and body included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of clients pages.
#[automock]
#[async_trait]
pub trait ManagementApi: Send + Sync {
    /// Fetch one page of clients, including the total count.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError`] classified for retry by
    /// [`DirectoryError::is_retryable`].
    async fn fetch_clients_page(
        &self,
        token: &BearerToken,
        page: u32,
        per_page: u32,
    ) -> Result<ClientsPage, DirectoryError>;
}

/// [`ManagementApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpManagementApi {
    http: Client,
    base_url: String,
    request_timeout: Duration,
}

impl HttpManagementApi {
    /// Client for `tenant`'s management API with [`DEFAULT_REQUEST_TIMEOUT`].
    #[must_use]
    pub fn new(http: Client, tenant: &TenantProfile) -> Self {
        Self {
            http,
            base_url: tenant.base_url(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Give up on a page request after `timeout`. The failure is a
    /// retryable [`DirectoryError::Transport`].
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[async_trait]
impl ManagementApi for HttpManagementApi {
    async fn fetch_clients_page(
        &self,
        token: &BearerToken,
        page: u32,
        per_page: u32,
    ) -> Result<ClientsPage, DirectoryError> {
        let url = format!("{}{CLIENTS_PATH}", self.base_url);

        debug!(page, per_page, "fetching clients page");

        let transport = |source| DirectoryError::Transport { page, source };

        let response = self
            .http
            .get(&url)
            .query(&[
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
                ("include_totals", "true".to_string()),
            ])
            .header(AUTHORIZATION, token.header_value())
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let text = response.text().await.map_err(transport)?;

        if status != StatusCode::OK {
            return Err(match serde_json::from_str::<ManagementApiError>(&text) {
                Ok(body) => DirectoryError::Api {
                    page,
                    status: status.as_u16(),
                    body,
                },
                Err(_) => DirectoryError::UnreadableError {
                    page,
                    status: status.as_u16(),
                    body: text,
                },
            });
        }

        serde_json::from_str(&text).map_err(|source| DirectoryError::Decode { page, source })
    }
}
