use authtool::config::ToolConfig;
use clap::{Args, Subcommand};

mod add;
mod list;
mod token;

#[derive(Debug, Args)]
pub(crate) struct ClientCommand {
    #[command(subcommand)]
    command: ClientSubcommand,
}

#[derive(Debug, Subcommand)]
enum ClientSubcommand {
    /// Add a client application
    Add(add::AddClientArgs),

    /// List configured clients
    #[command(visible_alias = "ls")]
    List(list::ListClientsArgs),

    /// Get a token for a configured client
    ///
    /// Browser-based clients must allow the redirect
    /// http://localhost:<redirect-port> (1000 by default).
    #[command(visible_alias = "tk")]
    Token(token::ClientTokenArgs),
}

pub(crate) async fn run(command: ClientCommand, config: &ToolConfig) -> Result<(), String> {
    match command.command {
        ClientSubcommand::Add(args) => add::run(args, config),
        ClientSubcommand::List(args) => list::run(args, config),
        ClientSubcommand::Token(args) => token::run(args, config).await,
    }
}
