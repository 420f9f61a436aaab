//! The eight refinement operators (§4.6).
//!
//! Every operator is a pure, total function over well-formed inputs:
//! `(State, args, Policy, Clock) -> (State, RefinementRecord)`. None of them
//! mutate their input state in place (§9 "immutable state").

mod conflict;
mod decay;
mod error;
mod incorporate;
mod merge;
mod negdefine;
mod penalty_decay;
mod query_next;
mod recontextualize;
mod split;

pub use conflict::conflict;
pub use decay::decay_refresh;
pub use error::{OperatorError, OperatorResult};
pub use incorporate::incorporate;
pub use merge::merge;
pub use negdefine::{negdefine, ConstraintSpec};
pub use penalty_decay::penalty_decay;
pub use query_next::query_next;
pub use recontextualize::recontextualize;
pub use split::{split, ChildSpec};

use crate::aggregator::{self, Aggregate};
use crate::clock::Timestamp;
use crate::context::Context;
use crate::definedness::{clamp_def, combine_def, SemanticDefinednessProvider};
use crate::penalty::PenaltyMode;
use crate::policy::Policy;
use crate::record::RefinementRecord;
use crate::state::State;

/// Recompute `ν_raw = 1 - Def` for `state` against the full (already
/// inserted) evidence set (I6). Returns the aggregate alongside the new
/// `ν_raw`, and records a note if the semantic provider had to be clamped
/// (§7 provider-failure).
pub(crate) fn recompute_nu_raw(
    state: &mut State,
    context: &Context,
    provider: &dyn SemanticDefinednessProvider,
    policy: &Policy,
    now: Timestamp,
) -> (Aggregate, Option<String>) {
    let agg = aggregator::aggregate(&state.e, &state.t, context, policy, now);
    let raw_def_sem = provider.semantic_definedness(state, context);
    let clamped = clamp_def(raw_def_sem);
    let note = clamped.was_clamped.then(|| {
        tracing::warn!(
            target = %state.t,
            context = %context.id,
            raw = raw_def_sem,
            "semantic-definedness provider returned an out-of-range value; clamped"
        );
        format!(
            "semantic-definedness provider returned {raw_def_sem}, clamped to {}",
            clamped.value
        )
    });
    let def = combine_def(clamped.value, agg.def_ep, agg.def_proc, policy);
    state.nu_raw = (1.0 - def).clamp(0.0, 1.0);
    (agg, note)
}

/// Build the `RefinementRecord` for an operator application, given the
/// pre/post states and penalty mode.
pub(crate) fn record(
    operator_name: &'static str,
    now: Timestamp,
    before: &State,
    after: &State,
    penalty_mode: PenaltyMode,
    evidence_added: Vec<crate::ids::EvidenceID>,
    notes: impl Into<String>,
) -> RefinementRecord {
    RefinementRecord {
        operator_name,
        time: now,
        before_nu_raw: before.nu_raw,
        before_nu: before.nu(penalty_mode),
        after_nu_raw: after.nu_raw,
        after_nu: after.nu(penalty_mode),
        penalties_delta: after.nu_penalties.clone(),
        evidence_added,
        notes: notes.into(),
    }
}

/// Apply the conflict cooldown/penalty rule (§4.6 Conflict) in place, given
/// an already-computed conflict level. Shared by the public `Conflict`
/// operator and by `Incorporate`, which invokes this at the end of its own
/// transition to maintain I4 without emitting a second record.
pub(crate) fn apply_conflict_update(
    state: &mut State,
    conflict: f64,
    policy: &Policy,
    now: Timestamp,
) {
    let cooldown_elapsed = state
        .m
        .conflict_last_applied
        .is_none_or(|last| now.since(last) >= policy.conflict_cooldown);

    if conflict >= policy.theta_conflict && cooldown_elapsed {
        let penalty = (conflict * policy.max_conflict_penalty).min(policy.max_conflict_penalty);
        state
            .nu_penalties
            .insert(crate::penalty::PenaltySource::Conflict, penalty);
        state.m.conflict_last_applied = Some(now);
        state.m.penalty_clear_start = None;
    } else if conflict < policy.theta_conflict_clear
        && state
            .nu_penalties
            .contains_key(&crate::penalty::PenaltySource::Conflict)
        && state.m.penalty_clear_start.is_none()
    {
        state.m.penalty_clear_start = Some(now);
    }
}

/// Verify the two range invariants that a buggy operator could actually
/// break: I1 (ν ∈ [0,1]) and I3 (every penalty contribution ∈ [0,1]), plus
/// the ν_raw range that I6's "ν_raw = 1 − Def" equation implies. Returns the
/// first violated invariant's name, if any.
///
/// I5 (the evidence set partitions by kind into three disjoint subsets) has
/// no runtime check here because it isn't a runtime property: `EvidenceKind`
/// is a closed three-variant enum (`Epistemic` / `Definitional` /
/// `Procedural`, see [`crate::evidence::EvidenceKind`]), so every item is in
/// exactly one partition by construction.
pub(crate) fn check_invariants(state: &State, policy: &Policy) -> Option<&'static str> {
    if !(0.0..=1.0).contains(&state.nu_raw) {
        return Some("nu_raw out of [0,1] (violates the range implied by I6's nu_raw = 1 - Def)");
    }
    let nu = state.nu(policy.penalty_mode);
    if !(0.0..=1.0).contains(&nu) {
        return Some("I1: nu out of [0,1]");
    }
    for value in state.nu_penalties.values() {
        if !(0.0..=1.0).contains(value) {
            return Some("I3: penalty contribution out of [0,1]");
        }
    }
    None
}
