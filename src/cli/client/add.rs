use authtool::{
    config::ToolConfig,
    prompt::{PromptError, Prompter, TerminalPrompter},
    store::{ClientProfile, ClientType, CredentialStore, TenantProfile},
};
use clap::Args;

use crate::cli::{describe, open_store, print_line, resolve_tenant};

#[derive(Debug, Args)]
pub(crate) struct AddClientArgs {
    /// Client name; prompted for when omitted
    name: Option<String>,
}

pub(crate) fn run(args: AddClientArgs, config: &ToolConfig) -> Result<(), String> {
    let AddClientArgs { name } = args;
    let mut store = open_store(config)?;

    let client = new_client(&store, &TerminalPrompter, name)?;
    let name = client.name.clone();

    store
        .add_client(client)
        .and_then(|()| store.save())
        .map_err(|error| format!("failed to save client: {}", describe(&error)))?;

    print_line(format!("client {name} added"))
}

fn new_client(
    store: &dyn CredentialStore,
    prompter: &dyn Prompter,
    name: Option<String>,
) -> Result<ClientProfile, String> {
    let failed = |error: PromptError| format!("failed to read client: {}", describe(&error));

    if store.list_tenants().is_empty() {
        return Err(
            "you must configure a tenant before adding a client; run `authtool tenant add <tenant name>`"
                .to_string(),
        );
    }

    let name = match name {
        Some(name) => name.trim().to_string(),
        None => prompter.input("Client Name", None).map_err(failed)?,
    };

    if store.get_client(&name).is_ok() {
        return Err(format!("client already exists with name {name}"));
    }

    let client_id = prompter.input("Client Id", None).map_err(failed)?;

    let labels: Vec<String> = ClientType::ALL
        .iter()
        .map(|client_type| client_type.label().to_string())
        .collect();
    let type_index = prompter.select("Client Type", &labels).map_err(failed)?;
    let client_type = ClientType::ALL
        .get(type_index)
        .copied()
        .ok_or_else(|| format!("client type selection {type_index} is out of range"))?;

    let client_secret = if client_type == ClientType::Native || client_type == ClientType::SinglePage
    {
        String::new()
    } else {
        prompter.input("Client Secret", None).map_err(failed)?
    };

    let tenant = resolve_tenant(store, prompter, None, "Tenant")?;
    let audience = default_audience(prompter, &tenant)?;

    Ok(ClientProfile {
        name,
        client_id,
        client_secret,
        client_type,
        tenant_name: tenant.name,
        audience,
    })
}

/// Audience requested when none is chosen at token time.
fn default_audience(
    prompter: &dyn Prompter,
    tenant: &TenantProfile,
) -> Result<Option<String>, String> {
    let failed = |error: PromptError| format!("failed to read audience: {}", describe(&error));

    if tenant.apis.is_empty() || !prompter.confirm("Set a default audience for this client?").map_err(failed)? {
        return Ok(None);
    }

    let index = prompter
        .select("Default audience", &tenant.api_names())
        .map_err(failed)?;

    tenant
        .apis
        .get(index)
        .map(|api| Some(api.audience.clone()))
        .ok_or_else(|| format!("audience selection {index} is out of range"))
}
