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
pub(crate) struct UpdateTenantArgs {
    /// Tenant name
    name: String,
}

pub(crate) fn run(args: UpdateTenantArgs, config: &ToolConfig) -> Result<(), String> {
    let UpdateTenantArgs { name } = args;
    let mut store = open_store(config)?;

    let tenant = updated_tenant(&store, &TerminalPrompter, &name)?;

    store
        .update_tenant(tenant)
        .and_then(|()| store.save())
        .map_err(|error| format!("failed to save tenant: {}", describe(&error)))?;

    print_line(format!("tenant {name} updated"))
}

/// The stored tenant with a new domain, default client and extra APIs.
fn updated_tenant(
    store: &dyn CredentialStore,
    prompter: &dyn Prompter,
    name: &str,
) -> Result<TenantProfile, String> {
    let mut tenant = store.get_tenant(name).map_err(|error| {
        format!("{error}; use `authtool tenant list` to list configured tenants")
    })?;

    tenant.domain = prompter
        .input("Tenant domain", Some(tenant.domain.clone()))
        .map_err(|error| format!("failed to read tenant domain: {}", describe(&error)))?;

    tenant.default_client = choose_default_client(store, prompter)?;

    let added = prompt_apis(prompter, tenant.apis.len())?;
    tenant.apis.extend(added);

    Ok(tenant)
}

#[cfg(test)]
mod tests {
    use authtool::{
        prompt::MockPrompter,
        store::{ApiDescriptor, MockCredentialStore},
    };
    use testresult::TestResult;

    use super::*;

    #[test]
    fn current_domain_is_offered_and_apis_kept() -> TestResult {
        let mut store = MockCredentialStore::new();
        store.expect_get_tenant().returning(|_| {
            Ok(TenantProfile {
                name: "t1".to_string(),
                domain: "old.example.com".to_string(),
                apis: vec![ApiDescriptor {
                    name: "api".to_string(),
                    audience: "aud1".to_string(),
                }],
                default_client: None,
            })
        });
        store.expect_list_clients().returning(|_| Vec::new());

        let mut prompter = MockPrompter::new();
        prompter
            .expect_input()
            .withf(|_, default| default.as_deref() == Some("old.example.com"))
            .returning(|_, _| Ok("new.example.com".to_string()));
        prompter
            .expect_confirm()
            .withf(|label| label.contains("more APIs"))
            .returning(|_| Ok(false));

        let tenant = updated_tenant(&store, &prompter, "T1")?;

        assert_eq!(tenant.domain, "new.example.com");
        assert_eq!(tenant.apis.len(), 1);

        Ok(())
    }

    #[test]
    fn unknown_tenant_is_an_error() {
        let mut store = MockCredentialStore::new();
        store.expect_get_tenant().returning(|name| {
            Err(authtool::store::StoreError::TenantNotFound(name.to_string()))
        });

        let result = updated_tenant(&store, &MockPrompter::new(), "nope");

        assert!(result.is_err(), "expected an error for an unknown tenant");
    }
}
