use super::ScenarioCatalog;
use crate::context::{Context, Dim};
use crate::dimension::var_idx::drop_bare_templates;
use crate::dimension::VarIdxDim;
use crate::entity::EntityCatalog;

impl ScenarioCatalog {
    /// Variables and indices with artifacts for the selected view and delta.
    ///
    /// Tabular views name one file per code, gridded views one directory; both
    /// come out of the parsed path. A bare template code is dropped when any
    /// of its numbered instances exists.
    pub async fn var_idxs(&self, ctx: &Context) -> EntityCatalog<VarIdxDim> {
        let spec = Self::scan_spec(ctx, Dim::VarIdx);
        let mut codes: Vec<String> = Vec::new();
        for hit in self.scan(&spec) {
            let code = hit.artifact.var_idx();
            if !codes.iter().any(|c| c == code) {
                codes.push(code.to_string());
            }
        }
        drop_bare_templates(&mut codes);
        EntityCatalog::from_codes(codes)
    }
}
