//! YAML file-backed credential store.

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::store::{ClientProfile, CredentialStore, StoreError, TenantProfile};

/// File holding tenant records.
pub const TENANT_CONFIG_FILE: &str = "tenant-config.yaml";

/// File holding client records.
pub const CLIENT_CONFIG_FILE: &str = "client-config.yaml";

/// Wildcard tenant name that lists clients of every tenant.
pub const ALL_TENANTS: &str = "all";

/// Credential store persisted as two YAML maps in the config directory.
///
/// Records are keyed by their lowercased name. The whole store is loaded on
/// open and only written back by [`FileCredentialStore::save`].
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    dir: PathBuf,
    tenants: BTreeMap<String, TenantProfile>,
    clients: BTreeMap<String, ClientProfile>,
}

impl FileCredentialStore {
    /// Open the store in `dir`, creating the directory and empty files when
    /// they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created or a store file
    /// cannot be read or parsed.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        ensure_dir(dir)?;

        let tenants = load_map(&dir.join(TENANT_CONFIG_FILE))?;
        let clients = load_map(&dir.join(CLIENT_CONFIG_FILE))?;

        debug!(
            dir = %dir.display(),
            tenants = tenants.len(),
            clients = clients.len(),
            "loaded credential store"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            tenants,
            clients,
        })
    }

    /// Directory the store lives in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Insert a new tenant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] when a tenant with the same name
    /// is already stored.
    pub fn add_tenant(&mut self, tenant: TenantProfile) -> Result<(), StoreError> {
        let key = store_key(&tenant.name);

        if self.tenants.contains_key(&key) {
            return Err(StoreError::AlreadyExists(format!("tenant {}", tenant.name)));
        }

        self.tenants.insert(key, tenant);

        Ok(())
    }

    /// Replace an existing tenant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TenantNotFound`] when no such tenant is stored.
    pub fn update_tenant(&mut self, tenant: TenantProfile) -> Result<(), StoreError> {
        let key = store_key(&tenant.name);

        let slot = self
            .tenants
            .get_mut(&key)
            .ok_or_else(|| StoreError::TenantNotFound(tenant.name.clone()))?;

        *slot = tenant;

        Ok(())
    }

    /// Insert a new client. The owning tenant must exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the tenant is unknown or the client name is taken.
    pub fn add_client(&mut self, client: ClientProfile) -> Result<(), StoreError> {
        if !self.tenants.contains_key(&store_key(&client.tenant_name)) {
            return Err(StoreError::TenantNotFound(client.tenant_name));
        }

        let key = store_key(&client.name);

        if self.clients.contains_key(&key) {
            return Err(StoreError::AlreadyExists(format!("client {}", client.name)));
        }

        self.clients.insert(key, client);

        Ok(())
    }

    /// Write both store files back to disk.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the write fails.
    pub fn save(&self) -> Result<(), StoreError> {
        write_map(&self.dir.join(TENANT_CONFIG_FILE), &self.tenants)?;
        write_map(&self.dir.join(CLIENT_CONFIG_FILE), &self.clients)?;

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get_tenant(&self, name: &str) -> Result<TenantProfile, StoreError> {
        self.tenants
            .get(&store_key(name))
            .cloned()
            .ok_or_else(|| StoreError::TenantNotFound(name.to_string()))
    }

    fn get_client(&self, name: &str) -> Result<ClientProfile, StoreError> {
        self.clients
            .get(&store_key(name))
            .cloned()
            .ok_or_else(|| StoreError::ClientNotFound(name.to_string()))
    }

    fn list_clients(&self, tenant_name: &str) -> Vec<ClientProfile> {
        let wanted = store_key(tenant_name);

        self.clients
            .values()
            .filter(|client| wanted == ALL_TENANTS || store_key(&client.tenant_name) == wanted)
            .cloned()
            .collect()
    }

    fn list_tenants(&self) -> Vec<TenantProfile> {
        self.tenants.values().cloned().collect()
    }
}

fn store_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn ensure_dir(dir: &Path) -> Result<(), StoreError> {
    match fs::metadata(dir) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(StoreError::NotADirectory(dir.to_path_buf())),
        Err(error) if error.kind() == ErrorKind::NotFound => create_private_dir(dir),
        Err(source) => Err(StoreError::ConfigDir {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(dir)
        .map_err(|source| StoreError::ConfigDir {
            path: dir.to_path_buf(),
            source,
        })
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(dir).map_err(|source| StoreError::ConfigDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn load_map<T: DeserializeOwned>(path: &Path) -> Result<BTreeMap<String, T>, StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            let empty = BTreeMap::<String, T>::new();
            fs::write(path, "{}\n").map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;

            return Ok(empty);
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    serde_norway::from_str(&contents).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_map<T: Serialize>(path: &Path, map: &BTreeMap<String, T>) -> Result<(), StoreError> {
    let yaml = serde_norway::to_string(map).map_err(StoreError::Serialize)?;

    fs::write(path, yaml).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
