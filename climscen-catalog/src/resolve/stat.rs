use super::ScenarioCatalog;
use crate::context::{Context, Dim};
use crate::dimension::{is_stat_code, HorizonSpan, StatDim, ViewCode, RCP_ALL};
use crate::entity::EntityCatalog;
use crate::grammar::{ArtifactPath, TabularMode};
use crate::tabular::{series_columns, HOR_COLUMN, RCP_COLUMN, STAT_COLUMN};

impl ScenarioCatalog {
    /// Statistics for the selected scenario and horizon.
    ///
    /// Over the reference period there is a single observed value, so only
    /// the mean is offered.
    pub async fn stats(&self, ctx: &Context) -> EntityCatalog<StatDim> {
        let view = ctx.view_code();
        let mut catalog: EntityCatalog<StatDim> = EntityCatalog::new();
        if view == Some(ViewCode::Cluster) {
            return catalog;
        }
        let mut spec = Self::scan_spec(ctx, Dim::Stat);
        if view == Some(ViewCode::Ts) {
            spec.mode = Some(TabularMode::Rcp);
        }
        let rcp = ctx.selected_code(Dim::Rcp).filter(|r| *r != RCP_ALL);
        let hor = ctx.selected_code(Dim::Hor);

        for hit in self.scan(&spec) {
            match &hit.artifact {
                ArtifactPath::Gridded { slot, .. } => {
                    if is_stat_code(slot) {
                        catalog.add(slot.as_str());
                    }
                }
                ArtifactPath::Tabular {
                    view,
                    mode: TabularMode::Rcp,
                    ..
                } => {
                    let Some(table) = self.table(&hit.path).await else {
                        continue;
                    };
                    if *view == ViewCode::Ts {
                        for column in series_columns(table.header()) {
                            if rcp.map_or(true, |r| column.rcp == r) {
                                catalog.add(column.effective_stat().code());
                            }
                        }
                    } else {
                        let mut filters = Vec::new();
                        if let Some(h) = hor {
                            filters.push((HOR_COLUMN, h));
                        }
                        if let Some(r) = rcp {
                            filters.push((RCP_COLUMN, r));
                        }
                        catalog.add(table.distinct(STAT_COLUMN, &filters));
                    }
                }
                ArtifactPath::Tabular { .. } => {}
            }
        }

        let reference = HorizonSpan::from(self.snapshot.reference_period()).code();
        if hor == Some(reference.as_str()) {
            catalog.collapse_to_mean();
        }
        catalog
    }
}
