//! Variable / climate index dimension
//!
//! Codes name a climate variable (`tas`, `pr`) or a derived index
//! (`txg_days_above`). A trailing `_<n>` marks the n-th instance of a
//! templated index, e.g. two thresholds of the same "days above" index.

use crate::context::Dim;
use crate::entity::{Dimension, Entity};
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};

static DESCRIPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("tas", "Mean temperature"),
        ("tasmin", "Minimum temperature"),
        ("tasmax", "Maximum temperature"),
        ("pr", "Precipitation"),
        ("evspsbl", "Evapotranspiration"),
        ("evspsblpot", "Potential evapotranspiration"),
        ("mrro", "Runoff"),
        ("snw", "Snow water equivalent"),
        ("sfcwindmax", "Maximum wind speed"),
        ("huss", "Specific humidity"),
        ("rsds", "Surface solar radiation"),
        ("prcptot", "Total wet-day precipitation"),
        ("rx1day", "Maximum 1-day precipitation"),
        ("rx5day", "Maximum 5-day precipitation"),
        ("cdd", "Maximum consecutive dry days"),
        ("cwd", "Maximum consecutive wet days"),
        ("sdii", "Simple daily intensity index"),
        ("r10mm", "Days with precipitation of at least 10 mm"),
        ("tng_months_below", "Months with mean minimum temperature below threshold"),
        ("tnx_days_above", "Days with minimum temperature above threshold"),
        ("tx_days_above", "Days with maximum temperature above threshold"),
        ("txg_days_above", "Days with mean maximum temperature above threshold"),
        ("tn_days_below", "Days with minimum temperature below threshold"),
        ("heat_wave_index", "Heat wave index"),
        ("wsdi", "Warm spell duration index"),
        ("csdi", "Cold spell duration index"),
        ("gsl", "Growing season length"),
        ("dc", "Drought code"),
    ])
});

/// Split a code into its base and optional instance number.
///
/// `tx_days_above_2` -> (`tx_days_above`, Some(2)); `tas` -> (`tas`, None).
pub fn split_instance(code: &str) -> (&str, Option<u32>) {
    match code.rsplit_once('_') {
        Some((base, n))
            if !base.is_empty() && !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) =>
        {
            match n.parse() {
                Ok(n) => (base, Some(n)),
                Err(_) => (code, None),
            }
        }
        _ => (code, None),
    }
}

/// Drop bare template codes for which numbered instances exist.
pub fn drop_bare_templates(codes: &mut Vec<String>) {
    let templated: BTreeSet<String> = codes
        .iter()
        .filter_map(|c| match split_instance(c) {
            (base, Some(_)) => Some(base.to_string()),
            _ => None,
        })
        .collect();
    codes.retain(|c| !templated.contains(c));
}

/// Sort key: base code, then instance number (bare first).
pub fn sort_key(code: &str) -> (String, u32) {
    let (base, n) = split_instance(code);
    (base.to_string(), n.unwrap_or(0))
}

#[derive(Debug)]
pub struct VarIdxDim;

impl Dimension for VarIdxDim {
    const DIM: Dim = Dim::VarIdx;

    fn describe(code: &str) -> String {
        let (base, instance) = split_instance(code);
        let name = DESCRIPTIONS.get(base).copied().unwrap_or(base);
        match instance {
            Some(n) => format!("{} ({})", name, n),
            None => name.to_string(),
        }
    }

    fn canonicalize(entities: &mut Vec<Entity<Self>>) {
        entities.sort_by_cached_key(|e| sort_key(e.code()));
    }
}
