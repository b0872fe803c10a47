//! View and delta resolvers

use super::ScenarioCatalog;
use crate::context::{Context, Dim};
use crate::dimension::{delta_code, DeltaDim, ViewCode, ViewDim};
use crate::entity::EntityCatalog;
use crate::grammar::{ArtifactPath, PathSpec, TabularMode};

impl ScenarioCatalog {
    /// Views with at least one indexed artifact anywhere under `<view>/`,
    /// whether or not its name follows the grammar; `cluster` when `ts` is
    /// legal and simulation tables exist.
    pub async fn views(&self, _ctx: &Context) -> EntityCatalog<ViewDim> {
        let index = self.snapshot().index();
        let mut catalog: EntityCatalog<ViewDim> = EntityCatalog::new();
        for view in ViewCode::ALL.into_iter().filter(|v| v.is_stored()) {
            let prefix = format!("{}/", view.code());
            if index.paths().any(|p| p.starts_with(&prefix)) {
                catalog.add(view.code());
            }
        }
        if !catalog.contains(ViewCode::Ts.code()) {
            return catalog;
        }
        let has_sim_tables = self.scan(&PathSpec::any()).iter().any(|h| {
            matches!(
                h.artifact,
                ArtifactPath::Tabular {
                    view: ViewCode::Ts,
                    mode: TabularMode::Sim,
                    ..
                }
            )
        });
        if has_sim_tables {
            catalog.add(ViewCode::Cluster.code());
        }
        catalog
    }

    /// Delta flags with artifacts for the selected view. The table view
    /// always offers deltas.
    pub async fn deltas(&self, ctx: &Context) -> EntityCatalog<DeltaDim> {
        let spec = Self::scan_spec(ctx, Dim::Delta);
        let mut catalog: EntityCatalog<DeltaDim> = self
            .scan(&spec)
            .iter()
            .map(|h| delta_code(h.artifact.delta()))
            .collect();
        if ctx.view_code() == Some(ViewCode::Tbl) {
            catalog.add(delta_code(true));
        }
        catalog
    }
}
