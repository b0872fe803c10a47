use super::ScenarioCatalog;
use crate::context::{Context, Dim};
use crate::dimension::{RcpDim, SimCode, ViewCode, RCP_ALL};
use crate::entity::EntityCatalog;
use crate::grammar::{ArtifactPath, TabularMode};
use crate::tabular::{series_columns, simulation_columns, HOR_COLUMN, RCP_COLUMN};

impl ScenarioCatalog {
    /// Emission scenarios.
    ///
    /// Gridded views carry the scenario in the file name. Time series list
    /// one column per scenario (or per simulation, for `cluster`) and the
    /// statistics table has an `rcp` column. The `rcp` aggregate is offered
    /// for time series when at least two future scenarios exist.
    pub async fn rcps(&self, ctx: &Context) -> EntityCatalog<RcpDim> {
        let view = ctx.view_code();
        let mut spec = Self::scan_spec(ctx, Dim::Rcp);
        if view == Some(ViewCode::Ts) {
            spec.mode = Some(TabularMode::Rcp);
        }
        let hor = ctx.selected_code(Dim::Hor);

        let mut catalog: EntityCatalog<RcpDim> = EntityCatalog::new();
        for hit in self.scan(&spec) {
            match &hit.artifact {
                ArtifactPath::Gridded { rcp, .. } => {
                    catalog.add(rcp.as_str());
                }
                ArtifactPath::Tabular { view, mode, .. } => {
                    let Some(table) = self.table(&hit.path).await else {
                        continue;
                    };
                    match (view, mode) {
                        (ViewCode::Ts, TabularMode::Rcp) => {
                            for column in series_columns(table.header()) {
                                catalog.add(column.rcp);
                            }
                        }
                        (ViewCode::Ts, TabularMode::Sim) => {
                            for sim in simulation_columns(table.header()) {
                                if let Some(sim) = SimCode::parse(&sim) {
                                    catalog.add(sim.rcp);
                                }
                            }
                        }
                        _ => {
                            let filters: Vec<(&str, &str)> =
                                hor.map(|h| (HOR_COLUMN, h)).into_iter().collect();
                            catalog.add(table.distinct(RCP_COLUMN, &filters));
                        }
                    }
                }
            }
        }

        if view.is_some_and(ViewCode::is_time_series) && catalog.future_count() >= 2 {
            catalog.add(RCP_ALL);
        }
        catalog
    }
}
