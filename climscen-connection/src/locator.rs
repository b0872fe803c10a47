//! Project root lookup
//!
//! Deciding where a project's tree lives (and whether the caller may see it)
//! is delegated to a [`ProjectLocator`]. The default locator treats every
//! directory under the data root as a project; deployments with their own
//! access rules supply a [`StaticLocator`] or a custom implementation.

use crate::error::Result;
use async_trait::async_trait;
use climscen_core::{join_relative, StorageBackend};
use std::collections::HashMap;
use std::fmt::Debug;

#[async_trait]
pub trait ProjectLocator: Debug + Send + Sync {
    /// Backend reference of a project's root, or `None` if the project is
    /// unknown or not accessible.
    ///
    /// `data_root` is the data root's path relative to the backend root.
    async fn locate(
        &self,
        backend: &dyn StorageBackend,
        data_root: &str,
        project: &str,
    ) -> Result<Option<String>>;
}

/// `<data_root>/<project>` by path.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryLocator;

#[async_trait]
impl ProjectLocator for DirectoryLocator {
    async fn locate(
        &self,
        backend: &dyn StorageBackend,
        data_root: &str,
        project: &str,
    ) -> Result<Option<String>> {
        if project.is_empty() || project.contains('/') || project.starts_with('.') {
            return Ok(None);
        }
        Ok(backend
            .resolve_path_to_id(&join_relative(data_root, project))
            .await?)
    }
}

/// Fixed project-name to backend-reference table ("virtual roots").
#[derive(Debug, Clone, Default)]
pub struct StaticLocator {
    roots: HashMap<String, String>,
}

impl StaticLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, project: impl Into<String>, root_ref: impl Into<String>) -> Self {
        self.roots.insert(project.into(), root_ref.into());
        self
    }
}

#[async_trait]
impl ProjectLocator for StaticLocator {
    async fn locate(
        &self,
        _backend: &dyn StorageBackend,
        _data_root: &str,
        project: &str,
    ) -> Result<Option<String>> {
        Ok(self.roots.get(project).cloned())
    }
}
