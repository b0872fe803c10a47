use super::ScenarioCatalog;
use crate::context::{Context, Dim};
use crate::dimension::{HorDim, HorizonSpan, ViewCode};
use crate::entity::EntityCatalog;
use crate::grammar::{ArtifactPath, TabularMode};
use crate::tabular::HOR_COLUMN;

impl ScenarioCatalog {
    /// Horizons: directory names of gridded views, the `hor` column of the
    /// statistics table. Time series span every year and have none.
    pub async fn horizons(&self, ctx: &Context) -> EntityCatalog<HorDim> {
        if ctx.view_code().is_some_and(ViewCode::is_time_series) {
            return EntityCatalog::new();
        }
        let spec = Self::scan_spec(ctx, Dim::Hor);
        let mut spans = Vec::new();
        for hit in self.scan(&spec) {
            match &hit.artifact {
                ArtifactPath::Gridded { hor, .. } => spans.push(*hor),
                ArtifactPath::Tabular {
                    view: ViewCode::Tbl,
                    mode: TabularMode::Rcp,
                    ..
                } => {
                    let Some(table) = self.table(&hit.path).await else {
                        continue;
                    };
                    spans.extend(
                        table
                            .distinct(HOR_COLUMN, &[])
                            .iter()
                            .filter_map(|code| HorizonSpan::parse(code).ok()),
                    );
                }
                ArtifactPath::Tabular { .. } => {}
            }
        }
        EntityCatalog::from_spans(spans)
    }
}
