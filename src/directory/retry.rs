//! Bounded constant-interval retry.

use std::{future::Future, time::Duration};

use tracing::warn;

use crate::directory::DirectoryError;

/// Default delay between attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 4;

/// Constant backoff with a fixed retry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before each retry.
    pub interval: Duration,

    /// Retries after the first attempt.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RETRY_INTERVAL,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl RetryPolicy {
    /// Run `attempt` until it succeeds, fails terminally or runs out of
    /// retries. Attempts never overlap.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable error as is, or
    /// [`DirectoryError::RetriesExhausted`] wrapping the last failure.
    pub async fn run<T, F, Fut>(&self, page: u32, mut attempt: F) -> Result<T, DirectoryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DirectoryError>>,
    {
        let mut attempts = 0;

        loop {
            attempts += 1;

            let error = match attempt().await {
                Ok(value) => return Ok(value),
                Err(error) if !error.is_retryable() => return Err(error),
                Err(error) => error,
            };

            if attempts > self.max_retries {
                return Err(DirectoryError::RetriesExhausted {
                    page,
                    attempts,
                    last: Box::new(error),
                });
            }

            warn!(page, attempts, %error, "retrying clients page");

            tokio::time::sleep(self.interval).await;
        }
    }
}
