//! Reading the contents of tabular artifacts
//!
//! Some dimensions of tabular views live inside the files rather than in
//! their names:
//!
//! - `ts/<v>/<v>_rcp_<d>.csv` has one column per scenario and statistic,
//!   `year,ref,rcp45_moy,rcp45_min,rcp45_max,...`
//! - `ts/<v>/<v>_sim_<d>.csv` has one column per simulation
//! - `tbl/<v>/<v>_rcp_<d>.csv` is a long table with `hor`, `rcp` and `stat`
//!   columns
//!
//! Records are comma separated with RFC 4180 quoting. A quoted field may not
//! span lines.

use crate::dimension::hor::canonical_code;
use crate::dimension::{SimCode, StatCode, RCP_REF};

pub const YEAR_COLUMN: &str = "year";
pub const HOR_COLUMN: &str = "hor";
pub const RCP_COLUMN: &str = "rcp";
pub const STAT_COLUMN: &str = "stat";

/// A parsed CSV table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Parse a whole table; `None` when there is no header line.
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = records(text);
        let header = lines.next()?;
        let rows = lines.collect();
        Some(Self { header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Rewrite every cell of a column in place.
    pub fn map_column(&mut self, name: &str, f: impl Fn(&str) -> Option<String>) {
        let Some(i) = self.column(name) else {
            return;
        };
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(i) {
                if let Some(mapped) = f(cell) {
                    *cell = mapped;
                }
            }
        }
    }

    /// Distinct values of a column, in first-seen order, over the rows that
    /// satisfy every `(column, value)` filter. A filter on a missing column
    /// rejects every row.
    pub fn distinct(&self, column: &str, filters: &[(&str, &str)]) -> Vec<String> {
        let Some(target) = self.column(column) else {
            return Vec::new();
        };
        let filters: Option<Vec<(usize, &str)>> = filters
            .iter()
            .map(|(col, value)| self.column(col).map(|i| (i, *value)))
            .collect();
        let Some(filters) = filters else {
            return Vec::new();
        };

        let mut out: Vec<String> = Vec::new();
        for row in &self.rows {
            let keep = filters
                .iter()
                .all(|(i, value)| row.get(*i).is_some_and(|cell| cell == value));
            if !keep {
                continue;
            }
            if let Some(cell) = row.get(target) {
                if !cell.is_empty() && !out.contains(cell) {
                    out.push(cell.clone());
                }
            }
        }
        out
    }
}

/// Header of a table without reading its rows.
pub fn header(text: &str) -> Option<Vec<String>> {
    records(text).next()
}

fn records(text: &str) -> impl Iterator<Item = Vec<String>> + '_ {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(split_record)
}

fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field).trim().to_string()),
            c => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

/// One value column of a scenario time series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesColumn {
    pub rcp: String,
    /// `None` for a column without a statistic suffix (the `ref` series)
    pub stat: Option<StatCode>,
}

impl SeriesColumn {
    /// `rcp45_moy` -> (`rcp45`, mean); `ref` -> (`ref`, none). The year
    /// column and empty names are not series.
    pub fn parse(name: &str) -> Option<Self> {
        if name.is_empty() || name == YEAR_COLUMN {
            return None;
        }
        if let Some((rcp, suffix)) = name.rsplit_once('_') {
            if let Some(stat) = StatCode::from_series_suffix(suffix) {
                if !rcp.is_empty() {
                    return Some(Self {
                        rcp: rcp.to_string(),
                        stat: Some(stat),
                    });
                }
            }
        }
        Some(Self {
            rcp: name.to_string(),
            stat: None,
        })
    }

    /// Statistic shown by this column; bare columns carry the mean.
    pub fn effective_stat(&self) -> StatCode {
        self.stat.unwrap_or(StatCode::Mean)
    }

    pub fn is_reference(&self) -> bool {
        self.rcp == RCP_REF
    }
}

/// Scenario columns of a `_rcp` time series header.
pub fn series_columns(header: &[String]) -> Vec<SeriesColumn> {
    header.iter().filter_map(|h| SeriesColumn::parse(h)).collect()
}

/// Simulation codes of a `_sim` time series header.
pub fn simulation_columns(header: &[String]) -> Vec<String> {
    header
        .iter()
        .filter(|h| SimCode::parse(h).is_some())
        .cloned()
        .collect()
}

/// Parse a long table, rewriting horizons (`1981_2010`) and statistics
/// (`moy`, `c10`) to their canonical codes so they compare equal to catalog
/// codes. Cells that do not parse are kept as they are.
pub fn long_table(text: &str) -> Option<CsvTable> {
    let mut table = CsvTable::parse(text)?;
    table.map_column(HOR_COLUMN, canonical_code);
    table.map_column(STAT_COLUMN, |s| {
        StatCode::from_series_suffix(s).map(|stat| stat.code())
    });
    Some(table)
}
