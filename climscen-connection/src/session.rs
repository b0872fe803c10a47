//! Per-session project snapshots
//!
//! A [`Session`] builds each project's [`VirtualFileIndex`] the first time the
//! project is requested and keeps it for the rest of the session. Concurrent
//! first requests for the same project share one build. Nothing is re-scanned:
//! artifacts written after the build stay invisible until a new session.

use crate::config::ProjectSettings;
use crate::connection::Connection;
use crate::error::Result;
use climscen_core::{AnyStorage, IndexRoot, VirtualFileIndex};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Immutable view of one project for the duration of a session.
#[derive(Debug)]
pub struct ProjectSnapshot {
    name: String,
    root_ref: Option<String>,
    shared_prefix: String,
    index: VirtualFileIndex,
    settings: ProjectSettings,
    default_reference_period: (i32, i32),
    storage: AnyStorage,
}

impl ProjectSnapshot {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend reference of the project root; `None` when the project could
    /// not be located and the snapshot is empty.
    pub fn root_ref(&self) -> Option<&str> {
        self.root_ref.as_deref()
    }

    /// Whether the project root was found on the backend.
    pub fn is_located(&self) -> bool {
        self.root_ref.is_some()
    }

    /// Index path prefix under which shared-root artifacts appear
    pub fn shared_prefix(&self) -> &str {
        &self.shared_prefix
    }

    pub fn index(&self) -> &VirtualFileIndex {
        &self.index
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    pub fn storage(&self) -> &AnyStorage {
        &self.storage
    }

    /// Project reference period, falling back to the connection default.
    pub fn reference_period(&self) -> (i32, i32) {
        self.settings
            .reference_period
            .unwrap_or(self.default_reference_period)
    }

    /// Read an indexed artifact; `Ok(None)` if the path is not indexed or the
    /// backend no longer has it.
    pub async fn read_text(&self, path: &str) -> Result<Option<String>> {
        let Some(reference) = self.index.backend_ref(path) else {
            return Ok(None);
        };
        match self.storage.read_text(reference).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Candidate names of a project's own INI file, in lookup order.
fn settings_paths(project: &str) -> [String; 2] {
    [format!("{}.ini", project), "project.ini".to_string()]
}

/// One user's session: lazily built, then frozen, project snapshots.
#[derive(Debug)]
pub struct Session {
    connection: Connection,
    projects: Mutex<HashMap<String, Arc<OnceCell<Arc<ProjectSnapshot>>>>>,
}

impl Session {
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            projects: Mutex::new(HashMap::new()),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Snapshot of a project, building its index on first access.
    pub async fn project(&self, name: &str) -> Result<Arc<ProjectSnapshot>> {
        let cell = self
            .projects
            .lock()
            .entry(name.to_string())
            .or_default()
            .clone();
        let snapshot = cell.get_or_try_init(|| self.build(name)).await?;
        Ok(snapshot.clone())
    }

    /// Projects whose snapshot has been built in this session.
    pub fn loaded_projects(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .projects
            .lock()
            .iter()
            .filter(|(_, cell)| cell.initialized())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    async fn build(&self, name: &str) -> Result<Arc<ProjectSnapshot>> {
        let conn = &self.connection;
        let shared_prefix = conn.config().shared_root.clone();
        let Some(root_ref) = conn.project_root(name).await? else {
            // An unlocated project is an empty catalog, not a failure
            let failures = conn.auth_failures();
            if failures > 0 {
                tracing::warn!(
                    target: "climscen::auth",
                    project = name,
                    failures,
                    "project not located after failed token refresh; catalog is empty"
                );
            } else {
                tracing::debug!(project = name, "project not located; catalog is empty");
            }
            return Ok(Arc::new(ProjectSnapshot {
                name: name.to_string(),
                root_ref: None,
                shared_prefix,
                index: VirtualFileIndex::default(),
                settings: ProjectSettings::default(),
                default_reference_period: conn.config().reference_period,
                storage: conn.storage().clone(),
            }));
        };

        let mut roots = vec![IndexRoot::new("", root_ref.clone())];
        match conn.shared_root_ref().await {
            Ok(Some(shared)) => roots.push(IndexRoot::new(shared_prefix.clone(), shared)),
            Ok(None) => tracing::debug!(shared_root = %shared_prefix, "no shared root"),
            Err(e) => tracing::warn!(error = %e, "shared root lookup failed"),
        }

        let index = VirtualFileIndex::build(conn.storage().as_ref(), &roots).await;
        let mut snapshot = ProjectSnapshot {
            name: name.to_string(),
            root_ref: Some(root_ref),
            shared_prefix,
            index,
            settings: ProjectSettings::default(),
            default_reference_period: conn.config().reference_period,
            storage: conn.storage().clone(),
        };

        for path in settings_paths(name) {
            if let Some(text) = snapshot.read_text(&path).await? {
                snapshot.settings = ProjectSettings::parse(&text)?;
                tracing::debug!(project = name, path = %path, "loaded project settings");
                break;
            }
        }

        tracing::info!(
            project = name,
            files = snapshot.index.len(),
            "project snapshot ready"
        );
        Ok(Arc::new(snapshot))
    }
}
