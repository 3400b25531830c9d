use authtool::{
    broker::TokenOutcome,
    config::ToolConfig,
    prompt::TerminalPrompter,
    store::{ALL_TENANTS, CredentialStore},
};
use clap::Args;

use crate::cli::{describe, open_store, print_line, select_client, token_broker};

#[derive(Debug, Args)]
pub(crate) struct ClientTokenArgs {
    /// Client name; prompted for when omitted
    name: Option<String>,
}

pub(crate) async fn run(args: ClientTokenArgs, config: &ToolConfig) -> Result<(), String> {
    let ClientTokenArgs { name } = args;
    let store = open_store(config)?;

    let client = match name {
        Some(name) => store
            .get_client(&name)
            .map_err(|error| format!("{error}; use `authtool client list` to list configured clients"))?,
        None => {
            let clients = store.list_clients(ALL_TENANTS);

            if clients.is_empty() {
                return Err("no clients configured; run `authtool client add` first".to_string());
            }

            select_client(&TerminalPrompter, clients, "Clients")?
        }
    };

    let tenant = store.get_tenant(&client.tenant_name).map_err(|error| {
        format!("client {} belongs to an unknown tenant: {error}", client.name)
    })?;

    let outcome = token_broker(config, reqwest::Client::new())
        .acquire(&client, &tenant)
        .await
        .map_err(|error| format!("failed to get token: {}", describe(&error)))?;

    match outcome {
        TokenOutcome::Bearer(token) => print_line(token.as_str()),
        TokenOutcome::BrowserDisplayed => {
            print_line("the token for this single-page application is shown in your browser")
        }
    }
}
