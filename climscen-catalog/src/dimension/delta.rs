//! Delta dimension: absolute values or anomalies relative to the reference period

use crate::context::Dim;
use crate::entity::{Dimension, Entity};

pub const DELTA_FALSE: &str = "False";
pub const DELTA_TRUE: &str = "True";

/// Code for a delta flag.
pub fn delta_code(delta: bool) -> &'static str {
    if delta {
        DELTA_TRUE
    } else {
        DELTA_FALSE
    }
}

/// Flag for a delta code.
pub fn parse_delta(code: &str) -> Option<bool> {
    match code {
        DELTA_FALSE => Some(false),
        DELTA_TRUE => Some(true),
        _ => None,
    }
}

#[derive(Debug)]
pub struct DeltaDim;

impl Dimension for DeltaDim {
    const DIM: Dim = Dim::Delta;

    fn describe(code: &str) -> String {
        match parse_delta(code) {
            Some(false) => "Absolute values".to_string(),
            Some(true) => "Change from reference period".to_string(),
            None => code.to_string(),
        }
    }

    fn canonicalize(entities: &mut Vec<Entity<Self>>) {
        entities.sort_by_key(|e| parse_delta(e.code()).map_or(2, u8::from));
    }
}
