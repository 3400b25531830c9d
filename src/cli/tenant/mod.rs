use authtool::{
    config::ToolConfig,
    prompt::Prompter,
    store::{ALL_TENANTS, ApiDescriptor, ClientProfile, CredentialStore, TenantProfile},
};
use clap::{Args, Subcommand};

use crate::cli::{describe, select_client};

mod add;
mod export;
mod list;
mod search;
mod update;

#[derive(Debug, Args)]
pub(crate) struct TenantCommand {
    #[command(subcommand)]
    command: TenantSubcommand,
}

#[derive(Debug, Subcommand)]
enum TenantSubcommand {
    /// Add a tenant
    Add(add::AddTenantArgs),

    /// List configured tenants
    #[command(visible_alias = "ls")]
    List,

    /// Update a configured tenant
    Update(update::UpdateTenantArgs),

    /// Fuzzy-search a tenant's live client directory
    #[command(visible_alias = "sr")]
    Search(search::SearchTenantArgs),

    /// Write an a0deploy config for a tenant
    Export(export::ExportTenantArgs),
}

pub(crate) async fn run(command: TenantCommand, config: &ToolConfig) -> Result<(), String> {
    match command.command {
        TenantSubcommand::Add(args) => add::run(args, config),
        TenantSubcommand::List => list::run(config),
        TenantSubcommand::Update(args) => update::run(args, config),
        TenantSubcommand::Search(args) => search::run(args, config).await,
        TenantSubcommand::Export(args) => export::run(args, config),
    }
}

/// Optional default client, picked from every stored client.
fn choose_default_client(
    store: &dyn CredentialStore,
    prompter: &dyn Prompter,
) -> Result<Option<ClientProfile>, String> {
    let clients = store.list_clients(ALL_TENANTS);

    if clients.is_empty() {
        return Ok(None);
    }

    let wanted = prompter
        .confirm("Set a default client for this tenant?")
        .map_err(|error| format!("prompt failed: {}", describe(&error)))?;

    if !wanted {
        return Ok(None);
    }

    select_client(prompter, clients, "Select a default client to use with this tenant").map(Some)
}

/// APIs entered one after another until the operator stops.
fn prompt_apis(prompter: &dyn Prompter, existing: usize) -> Result<Vec<ApiDescriptor>, String> {
    let failed = |error: authtool::prompt::PromptError| {
        format!("failed to read tenant API: {}", describe(&error))
    };

    let mut apis = Vec::new();

    loop {
        let label = if apis.len() + existing == 0 {
            "Add an API to this tenant?"
        } else {
            "Do you have more APIs to add to this tenant?"
        };

        if !prompter.confirm(label).map_err(failed)? {
            return Ok(apis);
        }

        let name = prompter.input("Tenant API name", None).map_err(failed)?;
        let audience = prompter.input("Tenant API audience", None).map_err(failed)?;

        apis.push(ApiDescriptor { name, audience });
    }
}

/// Client used to talk to the tenant's management API.
///
/// Offers the tenant's default client first, then its own clients.
fn client_for_tenant(
    store: &dyn CredentialStore,
    prompter: &dyn Prompter,
    tenant: &TenantProfile,
) -> Result<ClientProfile, String> {
    if let Some(default) = &tenant.default_client {
        let use_default = prompter
            .confirm(&format!(
                "Do you want to use the default client {} set on the tenant?",
                default.name
            ))
            .map_err(|error| format!("prompt failed: {}", describe(&error)))?;

        if use_default {
            return Ok(default.clone());
        }
    }

    let clients = store.list_clients(&tenant.name);

    if clients.is_empty() {
        return Err(format!(
            "you have no configured clients for the {} tenant; run `authtool client add` first",
            tenant.name
        ));
    }

    select_client(prompter, clients, "Select the client to use with this tenant")
}
