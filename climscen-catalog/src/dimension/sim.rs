//! Simulation dimension: `<RCM>_<domain>_<GCM>_<RCP>`

use crate::context::Dim;
use crate::dimension::rcp::RcpDim;
use crate::entity::{Dimension, Entity, EntityCatalog};

/// Parsed simulation code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimCode {
    pub rcm: String,
    pub domain: String,
    pub gcm: String,
    pub rcp: String,
}

impl SimCode {
    /// Exactly four non-empty, underscore-separated parts.
    pub fn parse(code: &str) -> Option<Self> {
        let parts: Vec<&str> = code.split('_').collect();
        match parts.as_slice() {
            [rcm, domain, gcm, rcp] if parts.iter().all(|p| !p.is_empty()) => Some(Self {
                rcm: rcm.to_string(),
                domain: domain.to_string(),
                gcm: gcm.to_string(),
                rcp: rcp.to_string(),
            }),
            _ => None,
        }
    }

    pub fn code(&self) -> String {
        format!("{}_{}_{}_{}", self.rcm, self.domain, self.gcm, self.rcp)
    }

    /// Regional/global model pair, `CRCM5/CanESM2`.
    pub fn model(&self) -> String {
        format!("{}/{}", self.rcm, self.gcm)
    }
}

#[derive(Debug)]
pub struct SimDim;

impl Dimension for SimDim {
    const DIM: Dim = Dim::Sim;

    fn describe(code: &str) -> String {
        match SimCode::parse(code) {
            Some(sim) => format!("{} ({})", sim.model(), RcpDim::describe(&sim.rcp)),
            None => code.to_string(),
        }
    }

    fn canonicalize(entities: &mut Vec<Entity<Self>>) {
        entities.sort_by(|a, b| a.code().cmp(b.code()));
    }
}

impl EntityCatalog<SimDim> {
    /// Keep simulations driven by one scenario.
    pub fn retain_rcp(&mut self, rcp: &str) -> &mut Self {
        self.retain(|e| SimCode::parse(e.code()).is_some_and(|s| s.rcp == rcp))
    }
}
