use std::{
    error::Error,
    fmt::Display,
    io::{self, Write},
    sync::Arc,
};

use authtool::{
    broker::{PromptAudienceSelector, SystemBrowser, TokenBroker},
    config::ToolConfig,
    prompt::{Prompter, TerminalPrompter},
    store::{ClientProfile, CredentialStore, FileCredentialStore, TenantProfile},
};
use clap::{Parser, Subcommand};

mod client;
mod tenant;

#[derive(Debug, Parser)]
#[command(
    name = "authtool",
    about = "Manage identity-provider tenants, clients and tokens",
    long_about = None
)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: ToolConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Configure and search tenants
    Tenant(tenant::TenantCommand),

    /// Configure clients and get tokens for them
    Client(client::ClientCommand),
}

impl Cli {
    pub(crate) fn log_level(&self) -> &str {
        &self.config.log_level
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Tenant(command) => tenant::run(command, &self.config).await,
            Commands::Client(command) => client::run(command, &self.config).await,
        }
    }
}

fn open_store(config: &ToolConfig) -> Result<FileCredentialStore, String> {
    let dir = config
        .config_path()
        .map_err(|error| format!("invalid config directory: {error}"))?;

    FileCredentialStore::open(&dir)
        .map_err(|error| format!("failed to open credential store: {}", describe(&error)))
}

fn token_broker(config: &ToolConfig, http: reqwest::Client) -> TokenBroker {
    let prompter: Arc<dyn Prompter> = Arc::new(TerminalPrompter);

    TokenBroker::with_http_client(
        http,
        config.broker_settings(),
        Arc::new(SystemBrowser),
        Arc::new(PromptAudienceSelector::new(prompter)),
    )
}

/// Tenant picked by name, or by the operator when no name was given.
fn resolve_tenant(
    store: &dyn CredentialStore,
    prompter: &dyn Prompter,
    name: Option<&str>,
    label: &str,
) -> Result<TenantProfile, String> {
    if let Some(name) = name {
        return store.get_tenant(name).map_err(|error| {
            format!("{error}; use `authtool tenant list` to list configured tenants")
        });
    }

    let tenants = store.list_tenants();

    if tenants.is_empty() {
        return Err(
            "no tenants configured; run `authtool tenant add <tenant name>` first".to_string(),
        );
    }

    let names: Vec<String> = tenants.iter().map(|tenant| tenant.name.clone()).collect();
    let index = prompter
        .select(label, &names)
        .map_err(|error| format!("tenant selection failed: {}", describe(&error)))?;

    tenants
        .into_iter()
        .nth(index)
        .ok_or_else(|| format!("tenant selection {index} is out of range"))
}

/// Client picked from `clients` by the operator.
fn select_client(
    prompter: &dyn Prompter,
    clients: Vec<ClientProfile>,
    label: &str,
) -> Result<ClientProfile, String> {
    let names: Vec<String> = clients.iter().map(|client| client.name.clone()).collect();

    let index = prompter
        .select(label, &names)
        .map_err(|error| format!("client selection failed: {}", describe(&error)))?;

    clients
        .into_iter()
        .nth(index)
        .ok_or_else(|| format!("client selection {index} is out of range"))
}

fn print_line(line: impl Display) -> Result<(), String> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "{line}").map_err(|error| format!("failed to write output: {error}"))
}

/// `error` followed by each of its sources.
fn describe(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}
