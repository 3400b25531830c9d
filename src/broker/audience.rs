//! Audience selection for token requests.

use std::{fmt, sync::Arc};

use mockall::automock;

use crate::{
    prompt::{PromptError, Prompter},
    store::TenantProfile,
};

/// Picks which of a tenant's APIs a token is requested for.
#[automock]
pub trait AudienceSelector: Send + Sync {
    /// Index into `tenant.apis`.
    ///
    /// # Errors
    ///
    /// Returns the prompt failure.
    fn select_audience(&self, tenant: &TenantProfile) -> Result<usize, PromptError>;
}

/// Asks the operator through a [`Prompter`].
#[derive(Clone)]
pub struct PromptAudienceSelector {
    prompter: Arc<dyn Prompter>,
}

impl PromptAudienceSelector {
    /// Wrap a prompter.
    #[must_use]
    pub fn new(prompter: Arc<dyn Prompter>) -> Self {
        Self { prompter }
    }
}

impl fmt::Debug for PromptAudienceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptAudienceSelector").finish_non_exhaustive()
    }
}

impl AudienceSelector for PromptAudienceSelector {
    fn select_audience(&self, tenant: &TenantProfile) -> Result<usize, PromptError> {
        self.prompter.select(
            "Select the audience that this token is for",
            &tenant.api_names(),
        )
    }
}
