//! Decay: refresh a state's ν_raw to reflect the passage of time over its
//! evidence, without touching the evidence itself (§4.6).

use crate::clock::Clock;
use crate::context::Context;
use crate::definedness::SemanticDefinednessProvider;
use crate::policy::Policy;
use crate::record::RefinementRecord;
use crate::state::State;

use super::{check_invariants, record, recompute_nu_raw, OperatorError, OperatorResult};

/// `Decay(state, policy, clock)` (§4.6). Distinct from [`super::penalty_decay`]:
/// this recomputes ν_raw against the aggregator's time-decayed evidence
/// weights; it never touches ν_penalties.
pub fn decay_refresh(
    mut state: State,
    context: &Context,
    provider: &dyn SemanticDefinednessProvider,
    policy: &Policy,
    clock: &dyn Clock,
) -> OperatorResult<(State, RefinementRecord)> {
    let before = state.clone();
    let now = clock.now();

    let (_, note) = recompute_nu_raw(&mut state, context, provider, policy, now);

    state.m.last_modified_time = now;
    state.m.history.push("Decay".to_string());

    if let Some(invariant) = check_invariants(&state, policy) {
        return Err(OperatorError::InvariantViolation {
            operator_name: "Decay",
            invariant,
            before_nu_raw: before.nu_raw,
            before_nu: before.nu(policy.penalty_mode),
        });
    }

    let rec = record(
        "Decay",
        now,
        &before,
        &state,
        policy.penalty_mode,
        Vec::new(),
        note.unwrap_or_default(),
    );
    Ok((state, rec))
}
