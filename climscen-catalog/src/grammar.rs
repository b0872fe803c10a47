//! Artifact naming grammar
//!
//! Every artifact path is relative to the project root:
//!
//! ```text
//! tabular  <view>/<var>/<var>_<mode>_<False|True>.csv                 (tbl, ts)
//! gridded  <view>/<var>/<s>-<e>/<var>_<rcp>_<s>_<e>_<slot>[_delta].csv (map, cycle)
//! ```
//!
//! `mode` is `rcp` (scenario ensemble) or `sim` (individual simulations) and
//! `slot` is a statistic or a simulation code. The `cluster` view has no
//! files of its own and reads the `ts` simulation tables.
//!
//! [`PathBuilder`] renders a [`PathSpec`] forward, to a concrete path when
//! every position is known or to a glob pattern with `*` in the unknown
//! positions. [`ArtifactPath::parse`] is the inverse. Glob patterns are a
//! coarse prefilter: callers parse each match and keep those for which
//! [`ArtifactPath::matches`] holds.

use crate::context::{Context, Dim};
use crate::dimension::{delta_code, is_stat_code, parse_delta, HorizonSpan, SimCode, ViewCode};
use crate::error::{CatalogError, Result};
use std::fmt;

pub const CSV_EXTENSION: &str = ".csv";
pub const DELTA_SUFFIX: &str = "_delta";
const ANY: &str = "*";

/// Content of a tabular artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabularMode {
    /// Ensemble statistics per scenario
    Rcp,
    /// One column per simulation
    Sim,
}

impl TabularMode {
    pub fn code(self) -> &'static str {
        match self {
            TabularMode::Rcp => "rcp",
            TabularMode::Sim => "sim",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "rcp" => Some(TabularMode::Rcp),
            "sim" => Some(TabularMode::Sim),
            _ => None,
        }
    }
}

/// One position of a path: a known code or a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Slot {
    Known(String),
    #[default]
    Any,
}

impl Slot {
    pub fn known(&self) -> Option<&str> {
        match self {
            Slot::Known(code) => Some(code),
            Slot::Any => None,
        }
    }

    pub fn accepts(&self, code: &str) -> bool {
        self.known().map_or(true, |k| k == code)
    }

    fn pattern(&self) -> &str {
        self.known().unwrap_or(ANY)
    }
}

impl From<Option<&str>> for Slot {
    fn from(code: Option<&str>) -> Self {
        match code {
            Some(code) if !code.is_empty() => Slot::Known(code.to_string()),
            _ => Slot::Any,
        }
    }
}

impl From<&str> for Slot {
    fn from(code: &str) -> Self {
        Slot::from(Some(code))
    }
}

/// Dimension values addressing one artifact, or a family of them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathSpec {
    /// `None`: any view with artifacts of its own
    pub view: Option<ViewCode>,
    pub var_idx: Slot,
    /// `None`: either flag
    pub delta: Option<bool>,
    /// Gridded views only
    pub hor: Option<HorizonSpan>,
    /// Gridded views only
    pub rcp: Slot,
    /// Statistic or simulation code, gridded views only
    pub slot: Slot,
    /// Tabular views only; `cluster` always reads `sim`
    pub mode: Option<TabularMode>,
}

impl PathSpec {
    /// Every position unknown.
    pub fn any() -> Self {
        Self::default()
    }

    /// Positions taken from the selections of a context. Unselected dimensions are
    /// wildcards; the statistic takes the slot when both it and a
    /// simulation are selected.
    pub fn from_context(ctx: &Context) -> Self {
        let view = ctx.view_code();
        let slot = match (ctx.selected_code(Dim::Stat), ctx.selected_code(Dim::Sim)) {
            (Some(stat), Some(sim)) => {
                tracing::debug!(stat, sim, "statistic and simulation both selected; using statistic");
                Slot::from(stat)
            }
            (Some(stat), None) => Slot::from(stat),
            (None, sim) => Slot::from(sim),
        };
        Self {
            view,
            var_idx: Slot::from(ctx.selected_code(Dim::VarIdx)),
            delta: ctx.selected_code(Dim::Delta).and_then(parse_delta),
            hor: ctx
                .selected_code(Dim::Hor)
                .and_then(|h| HorizonSpan::parse(h).ok()),
            rcp: Slot::from(ctx.selected_code(Dim::Rcp)),
            slot,
            mode: (view == Some(ViewCode::Cluster)).then_some(TabularMode::Sim),
        }
    }

    pub fn with_view(mut self, view: ViewCode) -> Self {
        self.view = Some(view);
        self
    }

    pub fn with_var_idx(mut self, code: &str) -> Self {
        self.var_idx = Slot::from(code);
        self
    }

    pub fn with_delta(mut self, delta: bool) -> Self {
        self.delta = Some(delta);
        self
    }

    pub fn with_hor(mut self, hor: HorizonSpan) -> Self {
        self.hor = Some(hor);
        self
    }

    pub fn with_rcp(mut self, code: &str) -> Self {
        self.rcp = Slot::from(code);
        self
    }

    pub fn with_slot(mut self, code: &str) -> Self {
        self.slot = Slot::from(code);
        self
    }

    pub fn with_mode(mut self, mode: TabularMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Mode actually read: `cluster` forces `sim`.
    fn effective_mode(&self) -> Option<TabularMode> {
        match self.view {
            Some(ViewCode::Cluster) => Some(TabularMode::Sim),
            _ => self.mode,
        }
    }
}

/// Forward direction of the grammar.
pub struct PathBuilder;

impl PathBuilder {
    /// Glob patterns covering every artifact `spec` may address: one per
    /// candidate view.
    pub fn patterns(spec: &PathSpec) -> Vec<String> {
        match spec.view {
            Some(view) => vec![Self::pattern_for(view, spec)],
            None => ViewCode::ALL
                .into_iter()
                .filter(|v| v.is_stored())
                .map(|v| Self::pattern_for(v, spec))
                .collect(),
        }
    }

    /// The concrete path of a fully specified artifact.
    pub fn build(spec: &PathSpec) -> Result<String> {
        let view = spec.view.ok_or_else(|| CatalogError::incomplete(Dim::View.name()))?;
        let var = known(&spec.var_idx, Dim::VarIdx)?;
        let delta = spec.delta.ok_or_else(|| CatalogError::incomplete(Dim::Delta.name()))?;
        let dir = view.artifact_view().code();
        if view.is_gridded() {
            let hor = spec.hor.ok_or_else(|| CatalogError::incomplete(Dim::Hor.name()))?;
            let rcp = known(&spec.rcp, Dim::Rcp)?;
            let slot = spec
                .slot
                .known()
                .ok_or_else(|| CatalogError::incomplete("stat or sim"))?;
            Ok(format!(
                "{}/{}/{}/{}_{}_{}_{}{}{}",
                dir,
                var,
                hor.code(),
                var,
                rcp,
                hor.underscored(),
                slot,
                if delta { DELTA_SUFFIX } else { "" },
                CSV_EXTENSION
            ))
        } else {
            let mode = spec
                .effective_mode()
                .ok_or_else(|| CatalogError::incomplete("mode"))?;
            Ok(format!(
                "{}/{}/{}_{}_{}{}",
                dir,
                var,
                var,
                mode.code(),
                delta_code(delta),
                CSV_EXTENSION
            ))
        }
    }

    fn pattern_for(view: ViewCode, spec: &PathSpec) -> String {
        let dir = view.artifact_view().code();
        let var = spec.var_idx.pattern();
        if view.is_gridded() {
            let (hor_dir, hor_name) = match spec.hor {
                Some(h) => (h.code(), h.underscored()),
                None => (ANY.to_string(), ANY.to_string()),
            };
            let mut slot = spec.slot.pattern().to_string();
            match spec.delta {
                Some(true) => slot.push_str(DELTA_SUFFIX),
                Some(false) => {}
                None if slot.ends_with(ANY) => {}
                None => slot.push_str(ANY),
            }
            format!(
                "{}/{}/{}/{}_{}_{}_{}{}",
                dir,
                var,
                hor_dir,
                var,
                spec.rcp.pattern(),
                hor_name,
                slot,
                CSV_EXTENSION
            )
        } else {
            let mode = spec.effective_mode().map_or(ANY, TabularMode::code);
            let flag = spec.delta.map_or(ANY, delta_code);
            format!("{}/{}/{}_{}_{}{}", dir, var, var, mode, flag, CSV_EXTENSION)
        }
    }
}

fn known(slot: &Slot, dim: Dim) -> Result<&str> {
    slot.known().ok_or_else(|| CatalogError::incomplete(dim.name()))
}

/// A relative path parsed under the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactPath {
    Tabular {
        view: ViewCode,
        var_idx: String,
        mode: TabularMode,
        delta: bool,
    },
    Gridded {
        view: ViewCode,
        var_idx: String,
        hor: HorizonSpan,
        rcp: String,
        slot: String,
        delta: bool,
    },
}

impl ArtifactPath {
    /// Parse a relative path; `None` when it does not follow the grammar.
    pub fn parse(path: &str) -> Option<Self> {
        let parts: Vec<&str> = path.split('/').collect();
        match parts.as_slice() {
            [view, var, file] => {
                let view = ViewCode::parse(view).filter(|v| v.is_stored() && !v.is_gridded())?;
                let rest = file
                    .strip_suffix(CSV_EXTENSION)?
                    .strip_prefix(var)?
                    .strip_prefix('_')?;
                let (mode, flag) = rest.split_once('_')?;
                Some(ArtifactPath::Tabular {
                    view,
                    var_idx: non_empty(var)?,
                    mode: TabularMode::parse(mode)?,
                    delta: parse_delta(flag)?,
                })
            }
            [view, var, hor_dir, file] => {
                let view = ViewCode::parse(view).filter(|v| v.is_gridded())?;
                let hor = HorizonSpan::parse(hor_dir).ok()?;
                if hor.code() != *hor_dir {
                    return None;
                }
                let stem = file
                    .strip_suffix(CSV_EXTENSION)?
                    .strip_prefix(var)?
                    .strip_prefix('_')?;
                let (stem, delta) = match stem.strip_suffix(DELTA_SUFFIX) {
                    Some(s) => (s, true),
                    None => (stem, false),
                };
                let (rcp, slot) = stem.split_once(&format!("_{}_", hor.underscored()))?;
                if rcp.is_empty() || rcp.contains('_') {
                    return None;
                }
                if !is_stat_code(slot) && SimCode::parse(slot).is_none() {
                    return None;
                }
                Some(ArtifactPath::Gridded {
                    view,
                    var_idx: non_empty(var)?,
                    hor,
                    rcp: rcp.to_string(),
                    slot: slot.to_string(),
                    delta,
                })
            }
            _ => None,
        }
    }

    pub fn view(&self) -> ViewCode {
        match self {
            ArtifactPath::Tabular { view, .. } | ArtifactPath::Gridded { view, .. } => *view,
        }
    }

    pub fn var_idx(&self) -> &str {
        match self {
            ArtifactPath::Tabular { var_idx, .. } | ArtifactPath::Gridded { var_idx, .. } => {
                var_idx
            }
        }
    }

    pub fn delta(&self) -> bool {
        match self {
            ArtifactPath::Tabular { delta, .. } | ArtifactPath::Gridded { delta, .. } => *delta,
        }
    }

    /// `PathSpec` addressing exactly this artifact.
    pub fn to_spec(&self) -> PathSpec {
        match self {
            ArtifactPath::Tabular {
                view,
                var_idx,
                mode,
                delta,
            } => PathSpec::any()
                .with_view(*view)
                .with_var_idx(var_idx)
                .with_delta(*delta)
                .with_mode(*mode),
            ArtifactPath::Gridded {
                view,
                var_idx,
                hor,
                rcp,
                slot,
                delta,
            } => PathSpec::any()
                .with_view(*view)
                .with_var_idx(var_idx)
                .with_delta(*delta)
                .with_hor(*hor)
                .with_rcp(rcp)
                .with_slot(slot),
        }
    }

    /// True if this artifact is one of those `spec` addresses.
    ///
    /// Positions that do not exist in this artifact's layout are ignored.
    pub fn matches(&self, spec: &PathSpec) -> bool {
        if let Some(view) = spec.view {
            if view.artifact_view() != self.view() {
                return false;
            }
        }
        if !spec.var_idx.accepts(self.var_idx()) {
            return false;
        }
        if spec.delta.is_some_and(|d| d != self.delta()) {
            return false;
        }
        match self {
            ArtifactPath::Tabular { mode, .. } => spec.effective_mode().map_or(true, |m| m == *mode),
            ArtifactPath::Gridded { hor, rcp, slot, .. } => {
                spec.hor.map_or(true, |h| h == *hor) && spec.rcp.accepts(rcp) && spec.slot.accepts(slot)
            }
        }
    }
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match PathBuilder::build(&self.to_spec()) {
            Ok(path) => f.write_str(&path),
            Err(_) => Err(fmt::Error),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use climscen_core::GlobPattern;

    const SAMPLES: &[&str] = &[
        "ts/pr/pr_rcp_False.csv",
        "ts/pr/pr_sim_True.csv",
        "tbl/tx_days_above_2/tx_days_above_2_rcp_True.csv",
        "map/tas/1981-2010/tas_ref_1981_2010_mean.csv",
        "map/tas/2021-2050/tas_rcp45_2021_2050_c010.csv",
        "cycle/pr/2021-2050/pr_rcp85_2021_2050_max_delta.csv",
        "map/tas/2021-2050/tas_rcp45_2021_2050_CRCM5_NAM-22_CanESM2_rcp45.csv",
        "map/tx_days_above_1/2041-2070/tx_days_above_1_rcp45_2041_2070_c090_delta.csv",
    ];

    #[test]
    fn test_round_trip() {
        for path in SAMPLES {
            let parsed = ArtifactPath::parse(path).unwrap_or_else(|| panic!("parse {}", path));
            assert_eq!(PathBuilder::build(&parsed.to_spec()).unwrap(), *path);
            assert_eq!(parsed.to_string(), *path);
            assert!(parsed.matches(&parsed.to_spec()));
        }
    }

    #[test]
    fn test_parse_fields() {
        let parsed = ArtifactPath::parse("cycle/pr/2021-2050/pr_rcp85_2021_2050_max_delta.csv");
        assert_eq!(
            parsed,
            Some(ArtifactPath::Gridded {
                view: ViewCode::Cycle,
                var_idx: "pr".to_string(),
                hor: HorizonSpan::from((2021, 2050)),
                rcp: "rcp85".to_string(),
                slot: "max".to_string(),
                delta: true,
            })
        );
    }

    #[test]
    fn test_mismatches_are_rejected() {
        for path in [
            "ts/pr/tas_rcp_False.csv",
            "ts/pr/pr_rcp_false.csv",
            "ts/pr/pr_ens_False.csv",
            "ts/pr/pr_rcp_False.txt",
            "cluster/pr/pr_sim_False.csv",
            "map/tas/2021_2050/tas_rcp45_2021_2050_mean.csv",
            "map/tas/2021-2050/tas_rcp45_1981_2010_mean.csv",
            "map/tas/2021-2050/tas_rcp45_2021_2050_median.csv",
            "map/tas/2021-2050/tas_2021_2050_mean.csv",
            "map/tas/tas_rcp45_2021_2050_mean.csv",
            "ts/pr/2021-2050/pr_rcp45_2021_2050_mean.csv",
            "context/regions.geojson",
        ] {
            assert_eq!(ArtifactPath::parse(path), None, "{}", path);
        }
    }

    #[test]
    fn test_build_requires_every_position() {
        let spec = PathSpec::any().with_view(ViewCode::Map).with_var_idx("tas");
        let err = PathBuilder::build(&spec).unwrap_err();
        assert!(matches!(err, CatalogError::Incomplete { dimension: "delta" }));

        let spec = spec.with_delta(false).with_hor(HorizonSpan::from((2021, 2050)));
        let err = PathBuilder::build(&spec).unwrap_err();
        assert!(matches!(err, CatalogError::Incomplete { dimension: "rcp" }));
    }

    #[test]
    fn test_cluster_reads_ts_sim_tables() {
        let spec = PathSpec::any()
            .with_view(ViewCode::Cluster)
            .with_var_idx("pr")
            .with_delta(false);
        assert_eq!(PathBuilder::build(&spec).unwrap(), "ts/pr/pr_sim_False.csv");
        assert_eq!(PathBuilder::patterns(&spec), vec!["ts/pr/pr_sim_False.csv"]);

        let sim = ArtifactPath::parse("ts/pr/pr_sim_False.csv").unwrap();
        let rcp = ArtifactPath::parse("ts/pr/pr_rcp_False.csv").unwrap();
        assert!(sim.matches(&spec));
        assert!(!rcp.matches(&spec));
    }

    #[test]
    fn test_patterns_put_wildcards_in_unknown_positions() {
        let spec = PathSpec::any().with_view(ViewCode::Map).with_var_idx("tas");
        assert_eq!(PathBuilder::patterns(&spec), vec!["map/tas/*/tas_*_*_*.csv"]);

        let spec = spec.with_hor(HorizonSpan::from((2021, 2050))).with_rcp("rcp45");
        assert_eq!(
            PathBuilder::patterns(&spec),
            vec!["map/tas/2021-2050/tas_rcp45_2021_2050_*.csv"]
        );

        let spec = spec.with_slot("mean");
        assert_eq!(
            PathBuilder::patterns(&spec),
            vec!["map/tas/2021-2050/tas_rcp45_2021_2050_mean*.csv"]
        );
        let spec = spec.with_delta(true);
        assert_eq!(
            PathBuilder::patterns(&spec),
            vec!["map/tas/2021-2050/tas_rcp45_2021_2050_mean_delta.csv"]
        );

        let all = PathBuilder::patterns(&PathSpec::any());
        assert_eq!(
            all,
            vec![
                "tbl/*/*_*_*.csv",
                "map/*/*/*_*_*_*.csv",
                "cycle/*/*/*_*_*_*.csv",
                "ts/*/*_*_*.csv",
            ]
        );
    }

    #[test]
    fn test_patterns_cover_their_artifacts() {
        for path in SAMPLES {
            let parsed = ArtifactPath::parse(path).unwrap();
            let mut spec = parsed.to_spec();
            // Leave the slot and delta open: the artifact must still be covered
            spec.slot = Slot::Any;
            spec.delta = None;
            let covered = PathBuilder::patterns(&spec)
                .iter()
                .any(|p| GlobPattern::new(p).unwrap().matches(path));
            assert!(covered, "{}", path);
        }
    }

    #[test]
    fn test_matches_filters_on_known_positions() {
        let path = ArtifactPath::parse("map/tas/2021-2050/tas_rcp45_2021_2050_c010.csv").unwrap();
        assert!(path.matches(&PathSpec::any()));
        assert!(path.matches(&PathSpec::any().with_view(ViewCode::Map).with_rcp("rcp45")));
        assert!(!path.matches(&PathSpec::any().with_rcp("rcp85")));
        assert!(!path.matches(&PathSpec::any().with_delta(true)));
        assert!(!path.matches(&PathSpec::any().with_view(ViewCode::Cycle)));
        assert!(!path.matches(&PathSpec::any().with_hor(HorizonSpan::from((1981, 2010)))));
    }

    #[test]
    fn test_statistic_takes_slot_over_simulation() {
        let mut ctx = Context::for_project("demo");
        ctx.select(Dim::View, "map").unwrap();
        ctx.select(Dim::Sim, "CRCM5_NAM-22_CanESM2_rcp45").unwrap();
        let spec = PathSpec::from_context(&ctx);
        assert_eq!(spec.slot.known(), Some("CRCM5_NAM-22_CanESM2_rcp45"));

        ctx.select(Dim::Stat, "c090").unwrap();
        let spec = PathSpec::from_context(&ctx);
        assert_eq!(spec.slot.known(), Some("c090"));
    }
}
