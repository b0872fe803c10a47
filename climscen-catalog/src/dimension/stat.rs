//! Statistic dimension: `mean`, `min`, `max` and centiles `c###`

use crate::context::Dim;
use crate::entity::{Dimension, Entity, EntityCatalog};

pub const STAT_MEAN: &str = "mean";
pub const STAT_MIN: &str = "min";
pub const STAT_MAX: &str = "max";

/// Parsed statistic code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatCode {
    Mean,
    Min,
    Centile(u16),
    Max,
}

impl StatCode {
    /// `mean`, `min`, `max`, or `c` followed by one to three digits (at most 100).
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            STAT_MEAN => Some(StatCode::Mean),
            STAT_MIN => Some(StatCode::Min),
            STAT_MAX => Some(StatCode::Max),
            _ => {
                let digits = code.strip_prefix('c')?;
                if digits.is_empty() || digits.len() > 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                let value: u16 = digits.parse().ok()?;
                (value <= 100).then_some(StatCode::Centile(value))
            }
        }
    }

    /// Canonical code; centiles are zero-padded to three digits.
    pub fn code(&self) -> String {
        match self {
            StatCode::Mean => STAT_MEAN.to_string(),
            StatCode::Min => STAT_MIN.to_string(),
            StatCode::Max => STAT_MAX.to_string(),
            StatCode::Centile(n) => format!("c{:03}", n),
        }
    }

    /// Statistic named by a time-series column suffix (`pr` + `_moy`).
    pub fn from_series_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "moy" | STAT_MEAN => Some(StatCode::Mean),
            STAT_MIN => Some(StatCode::Min),
            STAT_MAX => Some(StatCode::Max),
            other => Self::parse(other),
        }
    }

    pub fn description(&self) -> String {
        match self {
            StatCode::Mean => "Mean".to_string(),
            StatCode::Min => "Minimum".to_string(),
            StatCode::Max => "Maximum".to_string(),
            StatCode::Centile(n) => format!("{} centile", ordinal(u32::from(*n))),
        }
    }
}

/// True when the code names a statistic rather than a simulation.
pub fn is_stat_code(code: &str) -> bool {
    StatCode::parse(code).is_some()
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

#[derive(Debug)]
pub struct StatDim;

impl Dimension for StatDim {
    const DIM: Dim = Dim::Stat;

    fn describe(code: &str) -> String {
        StatCode::parse(code)
            .map(|s| s.description())
            .unwrap_or_else(|| code.to_string())
    }

    fn canonicalize(entities: &mut Vec<Entity<Self>>) {
        entities.sort_by(|a, b| {
            match (StatCode::parse(a.code()), StatCode::parse(b.code())) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.code().cmp(b.code()),
            }
        });
    }
}

impl EntityCatalog<StatDim> {
    /// Reference-period collapse: only `mean` survives.
    pub fn collapse_to_mean(&mut self) -> &mut Self {
        self.retain(|e| e.code() == STAT_MEAN)
    }
}
