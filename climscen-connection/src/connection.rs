//! Connection: a configured backend plus the data-root layout

use crate::config::{ConnectionConfig, DataSource};
use crate::error::{ConnectionError, Result};
use crate::locator::{DirectoryLocator, ProjectLocator};
use crate::session::Session;
use climscen_core::{join_relative, AnyStorage, LocalDisk, StorageBackend};
use climscen_storage_drive::RemoteDrive;
use std::sync::Arc;

/// A configured connection to a data tree.
///
/// The data root holds one directory per project plus the shared root.
/// Cheap to clone; every [`Session`] opened from it shares the backend.
#[derive(Debug, Clone)]
pub struct Connection {
    config: ConnectionConfig,
    storage: AnyStorage,
    /// Data root path relative to the backend root
    data_root: String,
    locator: Arc<dyn ProjectLocator>,
    drive: Option<Arc<RemoteDrive>>,
}

impl Connection {
    /// Create a connection over an existing backend whose root is the data root.
    pub fn new(config: ConnectionConfig, storage: AnyStorage) -> Self {
        Self {
            config,
            storage,
            data_root: String::new(),
            locator: Arc::new(DirectoryLocator),
            drive: None,
        }
    }

    /// Replace the project locator.
    pub fn with_locator(mut self, locator: Arc<dyn ProjectLocator>) -> Self {
        self.locator = locator;
        self
    }

    /// Place the data root below the backend root.
    pub fn with_data_root(mut self, data_root: impl Into<String>) -> Self {
        self.data_root = data_root.into().trim_matches('/').to_string();
        self
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn storage(&self) -> &AnyStorage {
        &self.storage
    }

    pub fn locator(&self) -> &Arc<dyn ProjectLocator> {
        &self.locator
    }

    pub fn data_root(&self) -> &str {
        &self.data_root
    }

    /// Failed token acquisitions on a drive backend (always 0 otherwise).
    pub fn auth_failures(&self) -> u64 {
        self.drive.as_ref().map_or(0, |d| d.auth_failures())
    }

    /// Backend reference of the data root.
    pub async fn data_root_ref(&self) -> Result<String> {
        self.storage
            .resolve_path_to_id(&self.data_root)
            .await?
            .ok_or_else(|| ConnectionError::not_found(format!("data root '{}'", self.data_root)))
    }

    /// Backend reference of the shared root, if it exists.
    pub async fn shared_root_ref(&self) -> Result<Option<String>> {
        Ok(self
            .storage
            .resolve_path_to_id(&join_relative(&self.data_root, &self.config.shared_root))
            .await?)
    }

    /// Backend reference of a project's root, if the locator knows it.
    pub async fn project_root(&self, project: &str) -> Result<Option<String>> {
        self.locator
            .locate(self.storage.as_ref(), &self.data_root, project)
            .await
    }

    /// Names of the project directories under the data root, sorted.
    ///
    /// The shared root and hidden directories are not projects.
    pub async fn list_projects(&self) -> Result<Vec<String>> {
        let root = self.data_root_ref().await?;
        let entries = self.storage.list(&root).await?;
        let mut projects: Vec<String> = entries
            .into_iter()
            .filter(|e| e.is_dir())
            .map(|e| e.name)
            .filter(|name| !name.starts_with('.') && *name != self.config.shared_root)
            .collect();
        projects.sort();
        projects.dedup();
        tracing::debug!(count = projects.len(), "listed projects");
        Ok(projects)
    }

    /// Open a new session with its own, initially empty, project snapshots.
    pub fn session(&self) -> Session {
        Session::new(self.clone())
    }
}

/// Create a connection from configuration, instantiating the backend.
pub fn connect(config: ConnectionConfig) -> Result<Connection> {
    match &config.source {
        DataSource::Local { base_dir } => {
            tracing::info!(base_dir = %base_dir.display(), "connecting to local data tree");
            let storage: AnyStorage = Arc::new(LocalDisk::new(base_dir.clone()));
            Ok(Connection::new(config, storage))
        }
        DataSource::Drive { drive, root_path } => {
            tracing::info!(
                api_base = %drive.api_base,
                root_id = %drive.root_id,
                root_path = %root_path,
                "connecting to remote drive"
            );
            let root_path = root_path.clone();
            let remote = Arc::new(RemoteDrive::new(drive.clone())?);
            let storage: AnyStorage = remote.clone();
            let mut connection = Connection::new(config, storage).with_data_root(root_path);
            connection.drive = Some(remote);
            Ok(connection)
        }
    }
}

/// Connect to a local directory with default settings.
pub fn connect_local(base_dir: impl AsRef<std::path::Path>) -> Connection {
    let config = ConnectionConfig::local(base_dir.as_ref());
    let storage: AnyStorage = Arc::new(LocalDisk::new(base_dir.as_ref()));
    Connection::new(config, storage)
}
