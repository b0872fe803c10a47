use climscen_catalog::{CatalogError, Context, Dim, HorizonSpan};

/// Dimension selections shared by `resolve` and `path`.
#[derive(clap::Args, Debug, Default)]
pub struct Selection {
    /// View: tbl, map, ts, cluster
    #[arg(long)]
    pub view: Option<String>,

    /// Delta flag: False or True
    #[arg(long)]
    pub delta: Option<String>,

    /// Variable or index code, e.g. tas or tx_days_above_1
    #[arg(long = "var")]
    pub var_idx: Option<String>,

    /// Horizon, e.g. 2021-2050
    #[arg(long)]
    pub hor: Option<String>,

    /// Emission scenario: ref, rcp26, rcp45, rcp85, or rcp for all
    #[arg(long)]
    pub rcp: Option<String>,

    /// Statistic: mean, min, max, or a centile such as c090
    #[arg(long)]
    pub stat: Option<String>,

    /// Simulation code
    #[arg(long)]
    pub sim: Option<String>,
}

impl Selection {
    /// Requested `(dimension, code)` pairs in dependency order.
    pub fn pairs(&self) -> Vec<(Dim, &str)> {
        [
            (Dim::View, &self.view),
            (Dim::Delta, &self.delta),
            (Dim::VarIdx, &self.var_idx),
            (Dim::Hor, &self.hor),
            (Dim::Rcp, &self.rcp),
            (Dim::Stat, &self.stat),
            (Dim::Sim, &self.sim),
        ]
        .into_iter()
        .filter_map(|(dim, code)| code.as_deref().map(|c| (dim, c)))
        .collect()
    }

    /// A fresh context for `project` holding the requested selections.
    ///
    /// Horizons are accepted in any spelling `HorizonSpan` parses.
    pub fn context(&self, project: &str) -> Result<Context, CatalogError> {
        let mut ctx = Context::for_project(project);
        for (dim, code) in self.pairs() {
            if dim == Dim::Hor {
                ctx.select(dim, &HorizonSpan::parse(code)?.code())?;
            } else {
                ctx.select(dim, code)?;
            }
        }
        Ok(ctx)
    }
}
