//! Horizon dimension: year ranges coded `<start>-<end>`
//!
//! Horizons reach this layer in several shapes (a directory name, a table
//! cell, a year pair from the project INI). [`HorizonInput`] names those
//! shapes and [`HorizonSpan::normalize`] turns each into the canonical span.

use crate::context::Dim;
use crate::entity::{Dimension, Entity, EntityCatalog};
use crate::error::{CatalogError, Result};
use std::fmt;

/// Raw horizon value before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum HorizonInput {
    /// `1981-2010`, `1981_2010`, `[1981, 2010]` or a single year `2050`
    Text(String),
    /// A single year, read as a one-year span
    Year(i32),
    /// Start and end years
    Pair(i32, i32),
    /// Start and end years from a numeric source; must be whole numbers
    FloatPair(f64, f64),
}

impl From<&str> for HorizonInput {
    fn from(text: &str) -> Self {
        HorizonInput::Text(text.to_string())
    }
}

impl From<i32> for HorizonInput {
    fn from(year: i32) -> Self {
        HorizonInput::Year(year)
    }
}

impl From<(i32, i32)> for HorizonInput {
    fn from((start, end): (i32, i32)) -> Self {
        HorizonInput::Pair(start, end)
    }
}

impl From<(f64, f64)> for HorizonInput {
    fn from((start, end): (f64, f64)) -> Self {
        HorizonInput::FloatPair(start, end)
    }
}

/// Inclusive year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HorizonSpan {
    pub start: i32,
    pub end: i32,
}

impl HorizonSpan {
    pub fn new(start: i32, end: i32) -> Result<Self> {
        if start > end {
            return Err(CatalogError::invalid_horizon(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Normalize any accepted input shape.
    pub fn normalize(input: impl Into<HorizonInput>) -> Result<Self> {
        match input.into() {
            HorizonInput::Text(text) => Self::parse(&text),
            HorizonInput::Year(year) => Self::new(year, year),
            HorizonInput::Pair(start, end) => Self::new(start, end),
            HorizonInput::FloatPair(start, end) => Self::new(whole_year(start)?, whole_year(end)?),
        }
    }

    /// Parse a textual horizon.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .trim();
        let parts: Vec<&str> = trimmed
            .split(|c| c == '-' || c == '_' || c == ',')
            .map(str::trim)
            .collect();
        let year = |s: &str| {
            s.parse::<i32>()
                .map_err(|_| CatalogError::invalid_horizon(text.to_string()))
        };
        match parts.as_slice() {
            [single] => {
                let y = year(single)?;
                Self::new(y, y)
            }
            [start, end] => Self::new(year(start)?, year(end)?),
            _ => Err(CatalogError::invalid_horizon(text.to_string())),
        }
    }

    /// Canonical code, `1981-2010`.
    pub fn code(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }

    /// Form used inside gridded file names, `1981_2010`.
    pub fn underscored(&self) -> String {
        format!("{}_{}", self.start, self.end)
    }
}

impl fmt::Display for HorizonSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl From<(i32, i32)> for HorizonSpan {
    fn from((start, end): (i32, i32)) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }
}

fn whole_year(value: f64) -> Result<i32> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i32::MAX as f64 {
        Ok(value as i32)
    } else {
        Err(CatalogError::invalid_horizon(format!("{} is not a year", value)))
    }
}

/// Canonical code for a horizon given as `1981_2010` or `1981-2010`; `None`
/// when it does not parse.
pub fn canonical_code(text: &str) -> Option<String> {
    HorizonSpan::parse(text).ok().map(|s| s.code())
}

/// Remove the rollup span (earliest start to latest end) when at least two
/// spans exist and the rollup is one of them.
pub fn remove_rollup(spans: &mut Vec<HorizonSpan>) -> Option<HorizonSpan> {
    if spans.len() < 2 {
        return None;
    }
    let start = spans.iter().map(|s| s.start).min()?;
    let end = spans.iter().map(|s| s.end).max()?;
    let rollup = HorizonSpan { start, end };
    let pos = spans.iter().position(|s| *s == rollup)?;
    // A catalog made only of the rollup and copies of it keeps it
    if spans.iter().all(|s| *s == rollup) {
        return None;
    }
    Some(spans.remove(pos))
}

#[derive(Debug)]
pub struct HorDim;

impl Dimension for HorDim {
    const DIM: Dim = Dim::Hor;

    fn describe(code: &str) -> String {
        match HorizonSpan::parse(code) {
            Ok(span) => format!("{} to {}", span.start, span.end),
            Err(_) => code.to_string(),
        }
    }

    fn canonicalize(entities: &mut Vec<Entity<Self>>) {
        entities.sort_by_cached_key(|e| {
            HorizonSpan::parse(e.code())
                .map(|s| (s.start, s.end))
                .unwrap_or((i32::MAX, i32::MAX))
        });
    }
}

impl EntityCatalog<HorDim> {
    /// Catalog of spans with the rollup removed.
    pub fn from_spans(mut spans: Vec<HorizonSpan>) -> Self {
        spans.sort();
        spans.dedup();
        if let Some(rollup) = remove_rollup(&mut spans) {
            tracing::debug!(horizon = %rollup, "dropped rollup horizon");
        }
        spans.iter().map(HorizonSpan::code).collect()
    }

    pub fn spans(&self) -> Vec<HorizonSpan> {
        self.iter()
            .filter_map(|e| HorizonSpan::parse(e.code()).ok())
            .collect()
    }
}
