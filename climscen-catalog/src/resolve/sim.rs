use super::ScenarioCatalog;
use crate::context::{Context, Dim};
use crate::dimension::{SimCode, SimDim, ViewCode, RCP_ALL};
use crate::entity::EntityCatalog;
use crate::grammar::{ArtifactPath, TabularMode};
use crate::tabular::simulation_columns;

impl ScenarioCatalog {
    /// Simulations driven by the selected scenario; all of them when no
    /// scenario or the `rcp` aggregate is selected.
    pub async fn sims(&self, ctx: &Context) -> EntityCatalog<SimDim> {
        let mut spec = Self::scan_spec(ctx, Dim::Sim);
        if ctx.view_code() == Some(ViewCode::Ts) {
            spec.mode = Some(TabularMode::Sim);
        }

        let mut catalog: EntityCatalog<SimDim> = EntityCatalog::new();
        for hit in self.scan(&spec) {
            match &hit.artifact {
                ArtifactPath::Gridded { slot, .. } => {
                    if SimCode::parse(slot).is_some() {
                        catalog.add(slot.as_str());
                    }
                }
                ArtifactPath::Tabular {
                    view: ViewCode::Ts,
                    mode: TabularMode::Sim,
                    ..
                } => {
                    if let Some(table) = self.table(&hit.path).await {
                        catalog.add(simulation_columns(table.header()));
                    }
                }
                ArtifactPath::Tabular { .. } => {}
            }
        }

        match ctx.selected_code(Dim::Rcp) {
            Some(rcp) if rcp != RCP_ALL => {
                catalog.retain_rcp(rcp);
            }
            _ => {}
        }
        catalog
    }
}
