//! Fetching the artifact a context points at

use crate::context::Context;
use crate::dimension::ViewCode;
use crate::error::Result;
use crate::grammar::{PathBuilder, PathSpec, TabularMode};
use crate::tabular::{long_table, CsvTable};
use climscen_connection::ProjectSnapshot;
use climscen_core::join_relative;
use std::sync::Arc;

/// Reads artifacts of one project through the same grammar the resolvers use.
#[derive(Debug, Clone)]
pub struct ArtifactLoader {
    snapshot: Arc<ProjectSnapshot>,
}

impl ArtifactLoader {
    pub fn new(snapshot: Arc<ProjectSnapshot>) -> Self {
        Self { snapshot }
    }

    /// `PathSpec` of the one artifact a context selects. Tabular views read the
    /// scenario table, except `cluster` which reads the simulation table.
    pub fn spec(ctx: &Context) -> PathSpec {
        let mut spec = PathSpec::from_context(ctx);
        if let Some(view) = spec.view {
            if !view.is_gridded() && view != ViewCode::Cluster {
                spec.mode = Some(TabularMode::Rcp);
            }
        }
        spec
    }

    /// Relative path of the selected artifact; an error names the first
    /// dimension still unselected.
    pub fn artifact_path(&self, ctx: &Context) -> Result<String> {
        PathBuilder::build(&Self::spec(ctx))
    }

    /// Backend reference of the selected artifact, if it exists.
    pub fn backend_ref(&self, ctx: &Context) -> Result<Option<String>> {
        let path = self.artifact_path(ctx)?;
        Ok(self.snapshot.index().backend_ref(&path).map(str::to_string))
    }

    /// Contents of the selected artifact; `Ok(None)` if it does not exist.
    pub async fn load_text(&self, ctx: &Context) -> Result<Option<String>> {
        let path = self.artifact_path(ctx)?;
        let text = self.snapshot.read_text(&path).await?;
        if text.is_none() {
            tracing::debug!(project = self.snapshot.name(), path = %path, "artifact not found");
        }
        Ok(text)
    }

    /// Parsed table of the selected artifact.
    pub async fn load_table(&self, ctx: &Context) -> Result<Option<CsvTable>> {
        Ok(self.load_text(ctx).await?.as_deref().and_then(long_table))
    }

    /// Contents of an artifact under the shared root, such as region
    /// boundaries.
    pub async fn load_shared(&self, name: &str) -> Result<Option<String>> {
        let path = join_relative(self.snapshot.shared_prefix(), name);
        Ok(self.snapshot.read_text(&path).await?)
    }
}
