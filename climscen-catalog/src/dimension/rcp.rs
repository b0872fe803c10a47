//! Emission scenario dimension
//!
//! `ref` (the observed reference period) always comes first; the other
//! scenarios follow in ascending code order and the synthetic `rcp`
//! aggregate ("all scenarios") comes last.

use crate::context::Dim;
use crate::entity::{Dimension, Entity, EntityCatalog};

pub const RCP_REF: &str = "ref";
pub const RCP_ALL: &str = "rcp";

/// Colour for codes without an entry in the table.
pub const DEFAULT_COLOR: &str = "#808080";

/// Known scenarios with their display attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RcpCode {
    Ref,
    Rcp26,
    Rcp45,
    Rcp85,
    All,
}

impl RcpCode {
    pub const ALL: [RcpCode; 5] = [
        RcpCode::Ref,
        RcpCode::Rcp26,
        RcpCode::Rcp45,
        RcpCode::Rcp85,
        RcpCode::All,
    ];

    pub fn code(self) -> &'static str {
        match self {
            RcpCode::Ref => RCP_REF,
            RcpCode::Rcp26 => "rcp26",
            RcpCode::Rcp45 => "rcp45",
            RcpCode::Rcp85 => "rcp85",
            RcpCode::All => RCP_ALL,
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.code() == code)
    }

    pub fn description(self) -> &'static str {
        match self {
            RcpCode::Ref => "Reference period",
            RcpCode::Rcp26 => "RCP 2.6",
            RcpCode::Rcp45 => "RCP 4.5",
            RcpCode::Rcp85 => "RCP 8.5",
            RcpCode::All => "All scenarios",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            RcpCode::Ref => "#636363",
            RcpCode::Rcp26 => "#2c7bb6",
            RcpCode::Rcp45 => "#fdae61",
            RcpCode::Rcp85 => "#d7191c",
            RcpCode::All => "#000000",
        }
    }
}

/// True for codes naming a future-emissions pathway (not `ref`, not the aggregate).
pub fn is_future(code: &str) -> bool {
    code != RCP_REF && code != RCP_ALL
}

/// Display colour of a code.
pub fn color_for(code: &str) -> &'static str {
    RcpCode::parse(code).map_or(DEFAULT_COLOR, RcpCode::color)
}

/// `rcp60` -> `RCP 6.0`; anything else is returned unchanged.
fn describe_pathway(code: &str) -> String {
    match code.strip_prefix("rcp") {
        Some(digits) if digits.len() == 2 && digits.bytes().all(|b| b.is_ascii_digit()) => {
            format!("RCP {}.{}", &digits[..1], &digits[1..])
        }
        _ => code.to_string(),
    }
}

#[derive(Debug)]
pub struct RcpDim;

impl Dimension for RcpDim {
    const DIM: Dim = Dim::Rcp;

    fn describe(code: &str) -> String {
        RcpCode::parse(code)
            .map(|r| r.description().to_string())
            .unwrap_or_else(|| describe_pathway(code))
    }

    fn canonicalize(entities: &mut Vec<Entity<Self>>) {
        entities.sort_by(|a, b| {
            let rank = |code: &str| match code {
                RCP_REF => 0,
                RCP_ALL => 2,
                _ => 1,
            };
            rank(a.code())
                .cmp(&rank(b.code()))
                .then_with(|| a.code().cmp(b.code()))
        });
    }
}

impl EntityCatalog<RcpDim> {
    /// Display colours, parallel to `codes()`.
    pub fn colors(&self) -> Vec<&'static str> {
        self.iter().map(|e| color_for(e.code())).collect()
    }

    /// Number of future-emissions pathways in the catalog.
    pub fn future_count(&self) -> usize {
        self.iter().filter(|e| is_future(e.code())).count()
    }
}
