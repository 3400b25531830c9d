use std::sync::Arc;

use authtool::{
    config::ToolConfig,
    directory::{DirectoryFetcher, HttpManagementApi},
    prompt::TerminalPrompter,
    search::run_console,
    session::{Session, SessionError},
};
use clap::{Args, ValueEnum};

use crate::cli::{describe, open_store, resolve_tenant, tenant::client_for_tenant, token_broker};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SearchTarget {
    Clients,
}

#[derive(Debug, Args)]
pub(crate) struct SearchTenantArgs {
    /// What to search for
    #[arg(value_enum)]
    target: SearchTarget,

    /// Tenant to search; prompted for when omitted
    #[arg(long)]
    tenant: Option<String>,
}

pub(crate) async fn run(args: SearchTenantArgs, config: &ToolConfig) -> Result<(), String> {
    let SearchTenantArgs {
        target: SearchTarget::Clients,
        tenant,
    } = args;

    let store = open_store(config)?;
    let prompter = TerminalPrompter;

    let tenant = resolve_tenant(&store, &prompter, tenant.as_deref(), "What tenant to search")?;
    let client = client_for_tenant(&store, &prompter, &tenant)?;

    let http = reqwest::Client::new();
    let broker = token_broker(config, http.clone());
    let api = HttpManagementApi::new(http, &tenant).with_request_timeout(config.request_timeout());
    let fetcher = DirectoryFetcher::new(Arc::new(api)).with_spinner();

    let mut session = Session::open(&broker, &fetcher, &client, &tenant)
        .await
        .map_err(|error| format!("search failed: {}", describe(&error)))?;

    tokio::task::spawn_blocking(move || run_console(&mut session).map_err(SessionError::from))
        .await
        .map_err(|error| format!("search console stopped unexpectedly: {error}"))?
        .map_err(|error| format!("search failed: {}", describe(&error)))
}
