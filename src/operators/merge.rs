//! Merge: union two states' evidence for a shared target, flagging conflict
//! that only the merge itself reveals (§4.6).

use crate::clock::Clock;
use crate::context::Context;
use crate::definedness::SemanticDefinednessProvider;
use crate::penalty::{PenaltyMap, PenaltySource};
use crate::policy::Policy;
use crate::record::RefinementRecord;
use crate::state::{Metadata, State};

use super::{check_invariants, record, recompute_nu_raw, OperatorError, OperatorResult};

fn union_penalties(a: &PenaltyMap, b: &PenaltyMap) -> PenaltyMap {
    let mut out = a.clone();
    for (source, value) in b {
        out.entry(*source)
            .and_modify(|v| *v = v.max(*value))
            .or_insert(*value);
    }
    out
}

fn merged_metadata(a: &Metadata, b: &Metadata, now: crate::clock::Timestamp) -> Metadata {
    let mut tags = a.tags.clone();
    for (k, v) in &b.tags {
        tags.entry(k.clone()).and_modify(|existing| *existing = existing.max(*v)).or_insert(*v);
    }
    let mut history = a.history.clone();
    history.extend(b.history.clone());
    history.push("Merge".to_string());
    let mut crossings = a.crossings.clone();
    crossings.extend(b.crossings.clone());
    Metadata {
        creation_time: a.creation_time.min(b.creation_time),
        last_modified_time: now,
        history,
        crossings,
        conflict_last_applied: a.conflict_last_applied.max(b.conflict_last_applied),
        penalty_clear_start: None,
        tags,
    }
}

/// `Merge(state_a, state_b, policy, clock)` (§4.6). The merged state is bound
/// to `context`, which both inputs' evidence is re-aggregated against.
pub fn merge(
    state_a: State,
    state_b: State,
    context: &Context,
    provider: &dyn SemanticDefinednessProvider,
    policy: &Policy,
    clock: &dyn Clock,
) -> OperatorResult<(State, RefinementRecord)> {
    if state_a.t != state_b.t {
        return Err(OperatorError::MergeTargetMismatch {
            a: state_a.t,
            b: state_b.t,
        });
    }

    let before = state_a.clone();
    let now = clock.now();

    let agg_a = crate::aggregator::aggregate(&state_a.e, &state_a.t, context, policy, now);
    let agg_b = crate::aggregator::aggregate(&state_b.e, &state_b.t, context, policy, now);
    let union_evidence = state_a.e.union(&state_b.e);

    let mut merged = State {
        t: state_a.t.clone(),
        k: context.id.clone(),
        nu_raw: state_a.nu_raw,
        nu_penalties: union_penalties(&state_a.nu_penalties, &state_b.nu_penalties),
        e: union_evidence,
        m: merged_metadata(&state_a.m, &state_b.m, now),
    };

    let (agg_merged, note) = recompute_nu_raw(&mut merged, context, provider, policy, now);

    let parents_were_clean = agg_a.conflict <= policy.theta_conflict && agg_b.conflict <= policy.theta_conflict;
    if agg_merged.conflict > policy.theta_conflict && parents_were_clean {
        let penalty = (agg_merged.conflict * policy.max_conflict_penalty).min(policy.max_conflict_penalty);
        merged.nu_penalties.insert(PenaltySource::MergeRupture, penalty);
    }

    if let Some(invariant) = check_invariants(&merged, policy) {
        return Err(OperatorError::InvariantViolation {
            operator_name: "Merge",
            invariant,
            before_nu_raw: before.nu_raw,
            before_nu: before.nu(policy.penalty_mode),
        });
    }

    let rec = record(
        "Merge",
        now,
        &before,
        &merged,
        policy.penalty_mode,
        Vec::new(),
        note.unwrap_or_default(),
    );
    Ok((merged, rec))
}
