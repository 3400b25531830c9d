//! Credential Store
//!
//! Local tenant and client records. The token broker and directory fetcher
//! only see the read-only [`CredentialStore`] trait; the CLI uses
//! [`FileCredentialStore`] directly to add and update records.

mod errors;
mod file;
mod models;

use mockall::automock;

pub use errors::*;
pub use file::{ALL_TENANTS, CLIENT_CONFIG_FILE, FileCredentialStore, TENANT_CONFIG_FILE};
pub use models::*;

/// Read-only view of the stored tenants and clients.
#[automock]
pub trait CredentialStore: Send + Sync {
    /// Tenant by name, case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TenantNotFound`] when no such tenant exists.
    fn get_tenant(&self, name: &str) -> Result<TenantProfile, StoreError>;

    /// Client by name, case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ClientNotFound`] when no such client exists.
    fn get_client(&self, name: &str) -> Result<ClientProfile, StoreError>;

    /// Clients owned by `tenant_name`, or every client for [`ALL_TENANTS`].
    fn list_clients(&self, tenant_name: &str) -> Vec<ClientProfile>;

    /// Every stored tenant.
    fn list_tenants(&self) -> Vec<TenantProfile>;
}
