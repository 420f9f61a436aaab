//! Conflict: recompute the conflict-derived penalty, respecting the
//! cooldown and clear-start bookkeeping (§4.6, I4).

use crate::aggregator;
use crate::clock::Clock;
use crate::context::Context;
use crate::penalty::PenaltySource;
use crate::policy::Policy;
use crate::record::RefinementRecord;
use crate::state::State;

use super::{apply_conflict_update, check_invariants, record, OperatorError, OperatorResult};

/// `Conflict(state, policy, clock)` (§4.6).
pub fn conflict(
    mut state: State,
    context: &Context,
    policy: &Policy,
    clock: &dyn Clock,
) -> OperatorResult<(State, RefinementRecord)> {
    let before = state.clone();
    let now = clock.now();

    let agg = aggregator::aggregate(&state.e, &state.t, context, policy, now);
    apply_conflict_update(&mut state, agg.conflict, policy, now);

    state.m.last_modified_time = now;
    state.m.history.push("Conflict".to_string());

    if let Some(invariant) = check_invariants(&state, policy) {
        return Err(OperatorError::InvariantViolation {
            operator_name: "Conflict",
            invariant,
            before_nu_raw: before.nu_raw,
            before_nu: before.nu(policy.penalty_mode),
        });
    }

    let rec = record(
        "Conflict",
        now,
        &before,
        &state,
        policy.penalty_mode,
        Vec::new(),
        format!("conflict={:.4}", agg.conflict),
    );
    Ok((state, rec))
}
