//! The refinement record: the provenance entry every operator produces
//! alongside its new state (§4.6, §4.8).

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::ids::EvidenceID;
use crate::penalty::PenaltyMap;

/// What one operator application did to a state's ν.
///
/// References states only by their ν values, never by the `State` itself —
/// this keeps the trace acyclic (§9 "provenance without cycles").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementRecord {
    pub operator_name: &'static str,
    pub time: Timestamp,
    pub before_nu_raw: f64,
    pub before_nu: f64,
    pub after_nu_raw: f64,
    pub after_nu: f64,
    /// Penalty sources touched by this operator, mapped to their new value
    /// (not the delta — a source present here had its value set or cleared).
    pub penalties_delta: PenaltyMap,
    pub evidence_added: Vec<EvidenceID>,
    pub notes: String,
}

impl RefinementRecord {
    pub fn nu_delta(&self) -> f64 {
        self.after_nu - self.before_nu
    }

    pub fn nu_raw_delta(&self) -> f64 {
        self.after_nu_raw - self.before_nu_raw
    }
}
