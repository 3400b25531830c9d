use authtool::{
    config::ToolConfig,
    prompt::{Prompter, TerminalPrompter},
    store::{CredentialStore, TenantProfile},
};
use clap::Args;

use crate::cli::{
    describe, open_store, print_line,
    tenant::{choose_default_client, prompt_apis},
};

#[derive(Debug, Args)]
pub(crate) struct AddTenantArgs {
    /// Tenant name
    name: String,
}

pub(crate) fn run(args: AddTenantArgs, config: &ToolConfig) -> Result<(), String> {
    let AddTenantArgs { name } = args;
    let mut store = open_store(config)?;

    let tenant = new_tenant(&store, &TerminalPrompter, &name)?;
    let name = tenant.name.clone();

    store
        .add_tenant(tenant)
        .and_then(|()| store.save())
        .map_err(|error| format!("failed to save tenant: {}", describe(&error)))?;

    print_line(format!("tenant {name} added"))
}

fn new_tenant(
    store: &dyn CredentialStore,
    prompter: &dyn Prompter,
    name: &str,
) -> Result<TenantProfile, String> {
    if store.get_tenant(name).is_ok() {
        return Err(format!(
            "tenant already exists with name {name}; use `authtool tenant update {name}` instead"
        ));
    }

    let domain = prompter
        .input("Tenant domain", None)
        .map_err(|error| format!("failed to read tenant domain: {}", describe(&error)))?;

    let default_client = choose_default_client(store, prompter)?;
    let apis = prompt_apis(prompter, 0)?;

    Ok(TenantProfile {
        name: name.trim().to_string(),
        domain,
        apis,
        default_client,
    })
}
