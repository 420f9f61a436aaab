//! The pluggable relevance function: how much an evidence item bears on a
//! given (target, context) pair.

use std::fmt;

use crate::context::Context;
use crate::evidence::EvidenceItem;
use crate::ids::TargetID;

/// `relevance(evidence, target, context) -> [0, 1]` (§6).
///
/// Implementations must be deterministic and side-effect-free (§5 shared
/// resource policy) — if a provider performs I/O, the engine's determinism
/// guarantee is forfeit.
pub trait RelevanceFn: fmt::Debug {
    fn relevance(&self, evidence: &EvidenceItem, target: &TargetID, context: &Context) -> f64;
}

/// The policy default: every item is fully relevant (§3 policy table).
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformRelevance;

impl RelevanceFn for UniformRelevance {
    fn relevance(&self, _evidence: &EvidenceItem, _target: &TargetID, _context: &Context) -> f64 {
        1.0
    }
}
