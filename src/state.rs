//! Per-(target, context) state and the information state Σ.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::evidence::{DedupMode, EvidenceSet};
use crate::ids::{ContextID, StateKey, TargetID};
use crate::penalty::{combine, PenaltyMap, PenaltyMode};

/// Metadata carried alongside a state: bookkeeping the operators consult but
/// that is never itself part of the ν equation, plus the numeric tags the
/// default semantic-definedness provider reads (§3, §4.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub creation_time: Timestamp,
    pub last_modified_time: Timestamp,
    pub history: Vec<String>,
    pub crossings: Vec<(ContextID, ContextID, Timestamp)>,
    pub conflict_last_applied: Option<Timestamp>,
    pub penalty_clear_start: Option<Timestamp>,
    pub tags: BTreeMap<String, f64>,
}

impl Metadata {
    pub fn fresh(now: Timestamp) -> Self {
        Self {
            creation_time: now,
            last_modified_time: now,
            history: Vec::new(),
            crossings: Vec::new(),
            conflict_last_applied: None,
            penalty_clear_start: None,
            tags: BTreeMap::new(),
        }
    }

    pub fn tag(&self, key: &str) -> f64 {
        self.tags.get(key).copied().unwrap_or(0.0)
    }
}

/// A single (target, context) information state (§3).
///
/// `ν_raw` and `ν_penalties` are stored; `ν` is always derived (I1) via
/// [`State::nu`] — never stored, never mutated directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub t: TargetID,
    pub k: ContextID,
    pub nu_raw: f64,
    pub nu_penalties: PenaltyMap,
    pub e: EvidenceSet,
    pub m: Metadata,
}

impl State {
    /// The default, untouched state for a (target, context) pair absent from
    /// Σ: `ν_raw = 1.0`, no penalties, no evidence (§3 "Information state Σ").
    pub fn initial(t: TargetID, k: ContextID, now: Timestamp, dedup_mode: DedupMode) -> Self {
        Self {
            t,
            k,
            nu_raw: 1.0,
            nu_penalties: PenaltyMap::new(),
            e: EvidenceSet::new(dedup_mode),
            m: Metadata::fresh(now),
        }
    }

    pub fn key(&self) -> StateKey {
        StateKey::new(self.t.clone(), self.k.clone())
    }

    /// `ν = clamp(ν_raw + combine(ν_penalties), 0, 1)` (I1).
    pub fn nu(&self, penalty_mode: PenaltyMode) -> f64 {
        (self.nu_raw + combine(&self.nu_penalties, penalty_mode)).clamp(0.0, 1.0)
    }
}

/// The global information state: a mapping `(TargetID, ContextID) -> State`.
/// Absent entries conceptually default to [`State::initial`] (§3).
pub type Sigma = std::collections::HashMap<StateKey, State>;
