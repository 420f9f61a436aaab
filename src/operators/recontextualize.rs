//! Recontextualize: rebind a state to a new context, re-deriving trust and
//! flagging scope expansion (§4.6).

use crate::boundary::retransform;
use crate::clock::Clock;
use crate::context::Context;
use crate::definedness::SemanticDefinednessProvider;
use crate::evidence::EvidenceSet;
use crate::penalty::PenaltySource;
use crate::policy::Policy;
use crate::record::RefinementRecord;
use crate::state::State;

use super::{check_invariants, record, recompute_nu_raw, OperatorError, OperatorResult};

/// `Recontextualize(state, new_context, policy, clock)` (§4.6). `old_context`
/// is required alongside `new_context` to detect scope expansion and decide
/// whether trust needs re-derivation.
pub fn recontextualize(
    mut state: State,
    old_context: &Context,
    new_context: &Context,
    provider: &dyn SemanticDefinednessProvider,
    policy: &Policy,
    clock: &dyn Clock,
) -> OperatorResult<(State, RefinementRecord)> {
    if new_context.id == state.k {
        return Err(OperatorError::RecontextualizeIdenticalContext {
            context: new_context.id.clone(),
        });
    }

    let before = state.clone();
    let now = clock.now();

    let mut retransformed = EvidenceSet::new(state.e.dedup_mode());
    for item in state.e.iter() {
        retransformed.insert(retransform(item, new_context, policy));
    }
    state.e = retransformed;
    state.k = new_context.id.clone();

    state
        .m
        .crossings
        .push((old_context.id.clone(), new_context.id.clone(), now));

    let old_scope = old_context.scope.len();
    let new_scope = new_context.scope.len();
    if new_scope > old_scope {
        let delta_ratio = (new_scope - old_scope) as f64 / new_scope.max(1) as f64;
        let penalty = (delta_ratio * policy.max_conflict_penalty).min(policy.max_conflict_penalty);
        state.nu_penalties.insert(PenaltySource::ScopeExpansion, penalty);
    }

    let (_, note) = recompute_nu_raw(&mut state, new_context, provider, policy, now);

    state.m.last_modified_time = now;
    state.m.history.push("Recontextualize".to_string());

    if let Some(invariant) = check_invariants(&state, policy) {
        return Err(OperatorError::InvariantViolation {
            operator_name: "Recontextualize",
            invariant,
            before_nu_raw: before.nu_raw,
            before_nu: before.nu(policy.penalty_mode),
        });
    }

    let rec = record(
        "Recontextualize",
        now,
        &before,
        &state,
        policy.penalty_mode,
        Vec::new(),
        note.unwrap_or_default(),
    );
    Ok((state, rec))
}
