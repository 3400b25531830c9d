//! Paginated directory fetch.

use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::{
    broker::BearerToken,
    directory::{ClientsPage, DirectoryError, DirectorySnapshot, ManagementApi, RetryPolicy},
};

/// Clients requested per page.
pub const PAGE_SIZE: u32 = 100;

const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Pages still needed after page 0 for `total` records.
#[must_use]
pub fn additional_pages(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }

    let pages = total.div_ceil(u64::from(per_page)).saturating_sub(1);

    u32::try_from(pages).unwrap_or(u32::MAX)
}

fn page_message(page: u32, remaining: u32) -> String {
    format!(
        "fetched page {} of {}",
        page.saturating_add(1),
        remaining.saturating_add(1)
    )
}

/// Builds a [`DirectorySnapshot`] from every clients page.
#[derive(Clone)]
pub struct DirectoryFetcher {
    api: Arc<dyn ManagementApi>,
    retry: RetryPolicy,
    spinner: bool,
}

impl std::fmt::Debug for DirectoryFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryFetcher")
            .field("retry", &self.retry)
            .field("spinner", &self.spinner)
            .finish_non_exhaustive()
    }
}

impl DirectoryFetcher {
    /// Fetcher with the default retry policy and no spinner.
    #[must_use]
    pub fn new(api: Arc<dyn ManagementApi>) -> Self {
        Self {
            api,
            retry: RetryPolicy::default(),
            spinner: false,
        }
    }

    /// Replace the per-page retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Show a terminal spinner while fetching.
    #[must_use]
    pub fn with_spinner(mut self) -> Self {
        self.spinner = true;
        self
    }

    /// Fetch every page in order.
    ///
    /// Nothing is returned unless every page succeeds.
    ///
    /// # Errors
    ///
    /// Returns the first page failure that is terminal or outlives the retry
    /// policy.
    pub async fn fetch_all(&self, token: &BearerToken) -> Result<DirectorySnapshot, DirectoryError> {
        let progress = self.progress();

        let result = self.fetch_pages(token, &progress).await;

        progress.finish_and_clear();

        if let Ok(snapshot) = &result {
            info!(entries = snapshot.len(), "directory fetched");
        }

        result
    }

    async fn fetch_pages(
        &self,
        token: &BearerToken,
        progress: &ProgressBar,
    ) -> Result<DirectorySnapshot, DirectoryError> {
        let first = self.fetch_page(token, 0).await?;
        let remaining = additional_pages(first.total, PAGE_SIZE);

        progress.set_message(page_message(0, remaining));

        let mut entries = first.clients;

        for page in 1..=remaining {
            let next = self.fetch_page(token, page).await?;
            entries.extend(next.clients);

            progress.set_message(page_message(page, remaining));
        }

        Ok(DirectorySnapshot::new(entries))
    }

    async fn fetch_page(&self, token: &BearerToken, page: u32) -> Result<ClientsPage, DirectoryError> {
        self.retry
            .run(page, || self.api.fetch_clients_page(token, page, PAGE_SIZE))
            .await
    }

    fn progress(&self) -> ProgressBar {
        if !self.spinner {
            return ProgressBar::hidden();
        }

        let spinner = ProgressBar::new_spinner();

        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }

        spinner.set_message("fetching clients");
        spinner.enable_steady_tick(SPINNER_TICK);

        spinner
    }
}
