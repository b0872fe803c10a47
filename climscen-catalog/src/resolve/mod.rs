//! Dimension resolvers
//!
//! Each resolver is a function of the current [`Context`] returning the
//! catalog of legal values for one dimension. It renders a [`PathSpec`] from
//! the context (unselected dimensions become wildcards), globs the project
//! index with the patterns [`PathBuilder`] derives from it, parses every hit
//! back with [`ArtifactPath::parse`] and collects the values of its
//! dimension, from the path itself or, for tabular views, from the file's
//! contents.
//!
//! Resolvers never fail: files that do not follow the grammar or cannot be
//! read are logged and skipped, and no legal value is an empty catalog.

mod hor;
mod rcp;
mod sim;
mod stat;
mod var_idx;
mod view;

use crate::context::{Context, Dim};
use crate::dimension::{DeltaDim, HorDim, RcpDim, SimDim, StatDim, VarIdxDim, ViewDim, RCP_ALL};
use crate::error::{CatalogError, Result};
use crate::grammar::{ArtifactPath, PathBuilder, PathSpec, Slot};
use crate::tabular::{long_table, CsvTable};
use climscen_connection::ProjectSnapshot;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Catalog resolution over one project snapshot.
///
/// Parsed tabular artifacts are kept for the lifetime of the catalog; the
/// snapshot they come from never changes.
#[derive(Debug)]
pub struct ScenarioCatalog {
    snapshot: Arc<ProjectSnapshot>,
    tables: Mutex<HashMap<String, Option<Arc<CsvTable>>>>,
}

/// An artifact matched by a resolver scan.
#[derive(Debug, Clone)]
pub(crate) struct Hit {
    pub path: String,
    pub artifact: ArtifactPath,
}

impl ScenarioCatalog {
    pub fn new(snapshot: Arc<ProjectSnapshot>) -> Self {
        Self {
            snapshot,
            tables: Mutex::new(HashMap::new()),
        }
    }

    pub fn project(&self) -> &str {
        self.snapshot.name()
    }

    pub fn snapshot(&self) -> &Arc<ProjectSnapshot> {
        &self.snapshot
    }

    /// Resolve every stale dimension of a context, in dependency order.
    ///
    /// A context without a project is bound to this catalog's project.
    pub async fn refresh(&self, ctx: &mut Context) -> Result<()> {
        match ctx.project().map(str::to_string) {
            Some(project) if project == self.project() => {}
            Some(project) => {
                return Err(CatalogError::ProjectMismatch {
                    context: project,
                    catalog: self.project().to_string(),
                })
            }
            None => ctx.set_project(self.project()),
        }

        for dim in Dim::ALL {
            if !ctx.is_stale(dim) {
                continue;
            }
            match dim {
                Dim::View => {
                    let catalog = self.views(ctx).await;
                    ctx.state_mut::<ViewDim>().set_catalog(catalog);
                }
                Dim::Delta => {
                    let catalog = self.deltas(ctx).await;
                    ctx.state_mut::<DeltaDim>().set_catalog(catalog);
                }
                Dim::VarIdx => {
                    let catalog = self.var_idxs(ctx).await;
                    ctx.state_mut::<VarIdxDim>().set_catalog(catalog);
                }
                Dim::Hor => {
                    let catalog = self.horizons(ctx).await;
                    ctx.state_mut::<HorDim>().set_catalog(catalog);
                }
                Dim::Rcp => {
                    let catalog = self.rcps(ctx).await;
                    ctx.state_mut::<RcpDim>().set_catalog(catalog);
                }
                Dim::Stat => {
                    let catalog = self.stats(ctx).await;
                    ctx.state_mut::<StatDim>().set_catalog(catalog);
                }
                Dim::Sim => {
                    let catalog = self.sims(ctx).await;
                    ctx.state_mut::<SimDim>().set_catalog(catalog);
                }
            }
            debug!(
                project = self.project(),
                dimension = %dim,
                selected = ctx.selected_code(dim).unwrap_or(""),
                "resolved"
            );
        }
        Ok(())
    }

    /// `PathSpec` for scanning on behalf of `target`: every dimension at or after
    /// the target is a wildcard, as is the aggregate scenario.
    pub(crate) fn scan_spec(ctx: &Context, target: Dim) -> PathSpec {
        let mut spec = PathSpec::from_context(ctx);
        for dim in Dim::ALL.into_iter().filter(|d| !target.depends_on(*d)) {
            match dim {
                Dim::View => {
                    spec.view = None;
                    spec.mode = None;
                }
                Dim::Delta => spec.delta = None,
                Dim::VarIdx => spec.var_idx = Slot::Any,
                Dim::Hor => spec.hor = None,
                Dim::Rcp => spec.rcp = Slot::Any,
                Dim::Stat | Dim::Sim => spec.slot = Slot::Any,
            }
        }
        if spec.rcp.known() == Some(RCP_ALL) {
            spec.rcp = Slot::Any;
        }
        spec
    }

    /// Artifacts addressed by a `PathSpec`, sorted by path.
    pub(crate) fn scan(&self, spec: &PathSpec) -> Vec<Hit> {
        let index = self.snapshot.index();
        let mut hits = Vec::new();
        for pattern in PathBuilder::patterns(spec) {
            let paths = match index.files_matching(&pattern) {
                Ok(paths) => paths,
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "unusable pattern");
                    continue;
                }
            };
            for path in paths {
                match ArtifactPath::parse(&path) {
                    Some(artifact) if artifact.matches(spec) => hits.push(Hit { path, artifact }),
                    Some(_) => {}
                    None => debug!(path = %path, "name does not follow the grammar, skipped"),
                }
            }
        }
        hits.sort_by(|a, b| a.path.cmp(&b.path));
        hits
    }

    /// Parsed contents of a tabular artifact; `None` if unreadable or empty.
    pub(crate) async fn table(&self, path: &str) -> Option<Arc<CsvTable>> {
        let cached = self.tables.lock().get(path).cloned();
        if let Some(table) = cached {
            return table;
        }
        let table = match self.snapshot.read_text(path).await {
            Ok(Some(text)) => {
                let table = long_table(&text).map(Arc::new);
                if table.is_none() {
                    debug!(path = %path, "no table header, skipped");
                }
                table
            }
            Ok(None) => None,
            Err(e) => {
                warn!(path = %path, error = %e, "artifact unreadable, skipped");
                None
            }
        };
        self.tables.lock().insert(path.to_string(), table.clone());
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::ViewCode;

    #[test]
    fn test_scan_spec_opens_target_and_downstream() {
        let mut ctx = Context::for_project("demo");
        for (dim, code) in [
            (Dim::View, "map"),
            (Dim::Delta, "False"),
            (Dim::VarIdx, "tas"),
            (Dim::Hor, "2021-2050"),
            (Dim::Rcp, "rcp45"),
            (Dim::Stat, "mean"),
        ] {
            ctx.select(dim, code).unwrap();
        }

        let spec = ScenarioCatalog::scan_spec(&ctx, Dim::Hor);
        assert_eq!(spec.view, Some(ViewCode::Map));
        assert_eq!(spec.var_idx.known(), Some("tas"));
        assert_eq!(spec.hor, None);
        assert_eq!(spec.rcp, Slot::Any);
        assert_eq!(spec.slot, Slot::Any);

        let spec = ScenarioCatalog::scan_spec(&ctx, Dim::Sim);
        assert_eq!(spec.rcp.known(), Some("rcp45"));
        assert_eq!(spec.slot, Slot::Any);

        ctx.select(Dim::Rcp, RCP_ALL).unwrap();
        let spec = ScenarioCatalog::scan_spec(&ctx, Dim::Stat);
        assert_eq!(spec.rcp, Slot::Any);
    }
}
