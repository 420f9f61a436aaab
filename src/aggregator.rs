//! Aggregation: fold a filtered, decayed evidence set into the raw numbers
//! that feed Def_ep, Def_proc, and the conflict signal (§4.3).

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::context::Context;
use crate::evidence::{EvidenceKind, EvidenceSet};
use crate::ids::TargetID;
use crate::policy::Policy;

/// `k` in `Def = 1 - exp(-k * mass)`, chosen so that a mass of 2.0 yields a
/// definedness of approximately 0.85 (§4.3): `k = -ln(0.15) / 2`.
const MASS_CURVE_K: f64 = 0.948_553_360_625_982_5;

/// Output of aggregating one evidence set against one (target, context) pair
/// at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub pos_mass: f64,
    pub neg_mass: f64,
    pub conflict: f64,
    pub def_ep: f64,
    pub def_proc: f64,
}

/// Monotone non-increasing decay over elapsed time, `decay(0) = 1`,
/// approaching 0 as `elapsed` grows past `half_life` (§4.3, §9 open
/// question: exponential half-life decay is the policy-configurable choice
/// made here).
pub fn decay(elapsed: chrono::TimeDelta, half_life: std::time::Duration) -> f64 {
    let half_life_ms = half_life.as_millis().max(1) as f64;
    let elapsed_ms = elapsed.num_milliseconds().max(0) as f64;
    0.5_f64.powf(elapsed_ms / half_life_ms)
}

fn mass_to_definedness(mass: f64) -> f64 {
    1.0 - (-MASS_CURVE_K * mass).exp()
}

/// `aggregate(evidence_set, target, context, policy, now)` (§4.3).
///
/// Epistemic items contribute `pos_mass`/`neg_mass`/`conflict`/`Def_ep`;
/// procedural items contribute only `Def_proc`; definitional items
/// contribute to neither (they feed Def_sem instead, via the semantic
/// provider, §4.4).
pub fn aggregate(
    evidence: &EvidenceSet,
    target: &TargetID,
    context: &Context,
    policy: &Policy,
    now: Timestamp,
) -> Aggregate {
    let mut pos_mass = 0.0_f64;
    let mut neg_mass = 0.0_f64;
    for item in evidence.by_kind(EvidenceKind::Epistemic) {
        let w = item.trust
            * policy.relevance_fn.relevance(item, target, context)
            * decay(now.since(item.time), policy.evidence_half_life);
        pos_mass += (item.valence * w).max(0.0);
        neg_mass += (-item.valence * w).max(0.0);
    }

    let conflict = if pos_mass + neg_mass == 0.0 {
        0.0
    } else {
        2.0 * pos_mass.min(neg_mass) / (pos_mass + neg_mass)
    };

    let def_ep = mass_to_definedness(pos_mass + neg_mass);

    let proc_mass: f64 = evidence
        .by_kind(EvidenceKind::Procedural)
        .map(|item| {
            item.trust
                * policy.relevance_fn.relevance(item, target, context)
                * decay(now.since(item.time), policy.evidence_half_life)
        })
        .sum();
    let def_proc = mass_to_definedness(proc_mass);

    Aggregate {
        pos_mass,
        neg_mass,
        conflict,
        def_ep,
        def_proc,
    }
}
