use std::{
    fs,
    path::{Path, PathBuf},
};

use authtool::{
    config::ToolConfig,
    prompt::TerminalPrompter,
    store::{ClientProfile, CredentialStore, TenantProfile},
};
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::cli::{open_store, print_line, tenant::client_for_tenant};

/// File written into the config directory.
const EXPORT_FILE: &str = "a0deploy-config.json";

#[derive(Debug, Args)]
pub(crate) struct ExportTenantArgs {
    /// Tenant name
    name: String,
}

#[derive(Debug, Serialize)]
struct DeployConfig<'a> {
    #[serde(rename = "AUTH0_DOMAIN")]
    domain: &'a str,

    #[serde(rename = "AUTH0_CLIENT_ID")]
    client_id: &'a str,

    #[serde(rename = "AUTH0_CLIENT_SECRET")]
    client_secret: &'a str,
}

pub(crate) fn run(args: ExportTenantArgs, config: &ToolConfig) -> Result<(), String> {
    let ExportTenantArgs { name } = args;
    let store = open_store(config)?;

    let tenant = store.get_tenant(&name).map_err(|error| {
        format!("{error}; use `authtool tenant list` to list configured tenants")
    })?;

    let client = client_for_tenant(&store, &TerminalPrompter, &tenant)?;
    let path = write_export(store.dir(), &tenant, &client)?;

    print_line(path.display())
}

fn write_export(dir: &Path, tenant: &TenantProfile, client: &ClientProfile) -> Result<PathBuf, String> {
    let body = serde_json::to_string_pretty(&DeployConfig {
        domain: &tenant.domain,
        client_id: &client.client_id,
        client_secret: &client.client_secret,
    })
    .map_err(|error| format!("failed to serialize export: {error}"))?;

    let path = dir.join(EXPORT_FILE);

    fs::write(&path, body)
        .map_err(|error| format!("failed to write {}: {error}", path.display()))?;

    info!(tenant = %tenant.name, client = %client.name, path = %path.display(), "tenant exported");

    Ok(path)
}
