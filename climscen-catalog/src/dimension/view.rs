//! View dimension: which kind of artifact is displayed

use crate::context::Dim;
use crate::entity::{Dimension, Entity};
use std::fmt;

/// Artifact layout of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One file per variable and mode at the view root
    Tabular,
    /// One directory per variable, one subdirectory per horizon
    Gridded,
}

/// The fixed set of views, declared in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewCode {
    Tbl,
    Map,
    Cycle,
    Ts,
    Cluster,
}

impl ViewCode {
    pub const ALL: [ViewCode; 5] = [
        ViewCode::Tbl,
        ViewCode::Map,
        ViewCode::Cycle,
        ViewCode::Ts,
        ViewCode::Cluster,
    ];

    pub fn code(self) -> &'static str {
        match self {
            ViewCode::Tbl => "tbl",
            ViewCode::Map => "map",
            ViewCode::Cycle => "cycle",
            ViewCode::Ts => "ts",
            ViewCode::Cluster => "cluster",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.code() == code)
    }

    pub fn description(self) -> &'static str {
        match self {
            ViewCode::Tbl => "Table of statistics",
            ViewCode::Map => "Map",
            ViewCode::Cycle => "Annual cycle",
            ViewCode::Ts => "Time series",
            ViewCode::Cluster => "Cluster of simulations",
        }
    }

    /// View whose artifacts this view reads (`cluster` is drawn from `ts` data).
    pub fn artifact_view(self) -> ViewCode {
        match self {
            ViewCode::Cluster => ViewCode::Ts,
            other => other,
        }
    }

    /// True for views that have a directory of artifacts of their own.
    pub fn is_stored(self) -> bool {
        self.artifact_view() == self
    }

    pub fn layout(self) -> Layout {
        match self.artifact_view() {
            ViewCode::Map | ViewCode::Cycle => Layout::Gridded,
            _ => Layout::Tabular,
        }
    }

    pub fn is_gridded(self) -> bool {
        self.layout() == Layout::Gridded
    }

    /// Views drawn as time series (and so offering the aggregate scenario).
    pub fn is_time_series(self) -> bool {
        self.artifact_view() == ViewCode::Ts
    }
}

impl fmt::Display for ViewCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug)]
pub struct ViewDim;

impl Dimension for ViewDim {
    const DIM: Dim = Dim::View;

    fn describe(code: &str) -> String {
        ViewCode::parse(code)
            .map(|v| v.description().to_string())
            .unwrap_or_else(|| code.to_string())
    }

    fn canonicalize(entities: &mut Vec<Entity<Self>>) {
        entities.sort_by_key(|e| ViewCode::parse(e.code()).map_or(usize::MAX, |v| v as usize));
    }
}
