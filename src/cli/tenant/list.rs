use authtool::{
    config::ToolConfig,
    store::{CredentialStore, TenantProfile},
};
use tabled::{builder::Builder, settings::Style};

use crate::cli::{open_store, print_line};

const NO_DEFAULT_CLIENT: &str = "No client configured";

pub(crate) fn run(config: &ToolConfig) -> Result<(), String> {
    let store = open_store(config)?;
    let tenants = store.list_tenants();

    if tenants.is_empty() {
        return print_line("no tenants configured");
    }

    print_line(tenant_table(&tenants))
}

fn tenant_table(tenants: &[TenantProfile]) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Tenant Name", "Domain", "Default Client", "APIs"]);

    for tenant in tenants {
        builder.push_record([
            tenant.name.clone(),
            tenant.domain.clone(),
            tenant
                .default_client
                .as_ref()
                .map_or_else(|| NO_DEFAULT_CLIENT.to_string(), |client| client.name.clone()),
            tenant.api_names().join(", "),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::blank());

    table.to_string()
}
