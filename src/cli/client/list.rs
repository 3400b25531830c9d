use authtool::{
    config::ToolConfig,
    prompt::{Prompter, TerminalPrompter},
    store::{ALL_TENANTS, ClientProfile, CredentialStore},
};
use clap::Args;
use tabled::{builder::Builder, settings::Style};

use crate::cli::{describe, open_store, print_line};

const VISIBLE_SECRET_CHARS: usize = 4;

#[derive(Debug, Args)]
pub(crate) struct ListClientsArgs {
    /// Tenant whose clients to list, or "all"; prompted for when omitted
    #[arg(long)]
    tenant: Option<String>,
}

pub(crate) fn run(args: ListClientsArgs, config: &ToolConfig) -> Result<(), String> {
    let ListClientsArgs { tenant } = args;
    let store = open_store(config)?;

    let tenant = match tenant {
        Some(tenant) => tenant,
        None => tenant_to_list(&store, &TerminalPrompter)?,
    };

    let clients = store.list_clients(&tenant);

    if clients.is_empty() {
        return print_line(format!("no clients configured for {tenant}"));
    }

    print_line(client_table(&clients))
}

/// With more than one tenant the operator picks one, or every tenant.
fn tenant_to_list(store: &dyn CredentialStore, prompter: &dyn Prompter) -> Result<String, String> {
    let mut names: Vec<String> = store
        .list_tenants()
        .into_iter()
        .map(|tenant| tenant.name)
        .collect();

    if names.len() <= 1 {
        return Ok(names.pop().unwrap_or_else(|| ALL_TENANTS.to_string()));
    }

    names.insert(0, ALL_TENANTS.to_string());

    let index = prompter
        .select("Which tenant do you want to list clients for", &names)
        .map_err(|error| format!("tenant selection failed: {}", describe(&error)))?;

    names
        .into_iter()
        .nth(index)
        .ok_or_else(|| format!("tenant selection {index} is out of range"))
}

fn client_table(clients: &[ClientProfile]) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Client Name", "Client ID", "Client Secret", "Type", "Tenant"]);

    for client in clients {
        builder.push_record([
            client.name.clone(),
            client.client_id.clone(),
            mask_secret(&client.client_secret),
            client.client_type.label().to_string(),
            client.tenant_name.clone(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::blank());

    table.to_string()
}

/// First few characters of `secret`, the rest starred out.
fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }

    let count = secret.chars().count();

    if count <= VISIBLE_SECRET_CHARS {
        return "*".repeat(count);
    }

    let visible: String = secret.chars().take(VISIBLE_SECRET_CHARS).collect();

    format!("{visible}{}", "*".repeat(count - VISIBLE_SECRET_CHARS))
}
