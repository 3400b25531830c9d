//! Directory models.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A client application as reported by the management API.
///
/// Every optional field is omitted when serializing, except `callbacks`: the
/// management API treats an omitted list differently from an empty one when
/// entries are written back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Display name.
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_first_party: Option<bool>,

    /// Allowed callback URLs; never absent.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub callbacks: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_origins: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_aliases: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_clients: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_logout_urls: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_types: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint_auth_method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc_conformant: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_configuration: Option<JwtConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_keys: Option<Vec<Map<String, Value>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<EncryptionKey>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sso: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sso_disabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_origin_auth: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_origin_loc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_login_page_on: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_login_page: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_login_page_preview: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_heroku_app: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addons: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_metadata: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_test_only: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
}

/// Token settings of a directory entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JwtConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime_in_seconds: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_encoded: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
}

/// Encryption key of a directory entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionKey {
    #[serde(rename = "pub", default, skip_serializing_if = "Option::is_none")]
    pub pub_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// One page of `GET /api/v2/clients` with `include_totals=true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientsPage {
    /// Total number of clients across all pages.
    pub total: u64,

    /// Clients on this page.
    #[serde(default)]
    pub clients: Vec<DirectoryEntry>,
}

/// All directory entries of a tenant, in API page order.
///
/// Built once by the fetcher and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectorySnapshot {
    entries: Vec<DirectoryEntry>,
}

impl DirectorySnapshot {
    #[must_use]
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Entry names in snapshot order, as fed to the matcher.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    /// First entry whose name equals `name`, ignoring case.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&DirectoryEntry> {
        let wanted = name.to_lowercase();

        self.entries
            .iter()
            .find(|entry| entry.name.to_lowercase() == wanted)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn named(name: &str, client_id: &str) -> DirectoryEntry {
        DirectoryEntry {
            name: name.to_string(),
            client_id: Some(client_id.to_string()),
            ..DirectoryEntry::default()
        }
    }

    #[test]
    fn absent_callbacks_become_empty_list() -> TestResult {
        let entry: DirectoryEntry = serde_json::from_value(json!({ "name": "acme-web" }))?;

        assert!(entry.callbacks.is_empty(), "callbacks should be empty");

        Ok(())
    }

    #[test]
    fn null_callbacks_become_empty_list() -> TestResult {
        let entry: DirectoryEntry =
            serde_json::from_value(json!({ "name": "acme-web", "callbacks": null }))?;

        assert!(entry.callbacks.is_empty(), "callbacks should be empty");

        Ok(())
    }

    #[test]
    fn empty_callbacks_are_always_serialized() -> TestResult {
        let value = serde_json::to_value(named("acme-web", "id-1"))?;

        assert_eq!(value.get("callbacks"), Some(&json!([])));
        assert_eq!(value.get("description"), None);

        Ok(())
    }

    #[test]
    fn unknown_fields_are_ignored() -> TestResult {
        let entry: DirectoryEntry = serde_json::from_value(json!({
            "name": "acme-web",
            "tenant": "t1",
            "callbacks": ["http://localhost:3000/cb"],
            "jwt_configuration": { "alg": "RS256", "lifetime_in_seconds": 36000 }
        }))?;

        assert_eq!(entry.callbacks, vec!["http://localhost:3000/cb".to_string()]);
        assert_eq!(
            entry.jwt_configuration.and_then(|jwt| jwt.alg),
            Some("RS256".to_string())
        );

        Ok(())
    }

    #[test]
    fn find_by_name_ignores_case_and_takes_first() {
        let snapshot = DirectorySnapshot::new(vec![
            named("Acme-Web", "first"),
            named("acme-web", "second"),
            named("beta-spa", "third"),
        ]);

        let upper = snapshot.find_by_name("ACME-WEB").and_then(|e| e.client_id.clone());
        let lower = snapshot.find_by_name("acme-web").and_then(|e| e.client_id.clone());

        assert_eq!(upper, Some("first".to_string()));
        assert_eq!(upper, lower);
        assert!(snapshot.find_by_name("gamma").is_none(), "gamma is not in the snapshot");
    }

    #[test]
    fn names_keep_snapshot_order() {
        let snapshot = DirectorySnapshot::new(vec![named("b", "1"), named("a", "2")]);

        assert_eq!(snapshot.names(), vec!["b".to_string(), "a".to_string()]);
        assert_eq!(snapshot.len(), 2);
    }
}
