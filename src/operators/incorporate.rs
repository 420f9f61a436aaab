//! Incorporate: apply the boundary transform to new evidence, insert it,
//! recompute ν_raw, then fold in the Conflict update to maintain I4 (§4.6).

use crate::boundary::role_factor;
use crate::clock::Clock;
use crate::context::Context;
use crate::definedness::SemanticDefinednessProvider;
use crate::evidence::EvidenceItem;
use crate::ids::EvidenceID;
use crate::policy::Policy;
use crate::record::RefinementRecord;
use crate::state::State;

use super::{apply_conflict_update, check_invariants, record, recompute_nu_raw, OperatorError, OperatorResult};

/// `Incorporate(state, new_evidence, policy, clock)` (§4.6).
///
/// `new_evidence` items are expected raw: `trust` and `pre_transform_trust`
/// equal, as produced by [`EvidenceItem::new`] before any boundary transform.
/// Incorporate re-derives the stored trust from `context.role(item.src)`.
pub fn incorporate(
    mut state: State,
    context: &Context,
    new_evidence: Vec<EvidenceItem>,
    provider: &dyn SemanticDefinednessProvider,
    policy: &Policy,
    clock: &dyn Clock,
) -> OperatorResult<(State, RefinementRecord)> {
    let before = state.clone();
    let now = clock.now();

    let mut evidence_added: Vec<EvidenceID> = Vec::new();
    for item in new_evidence {
        let role = context.role(&item.src);
        let transformed = item.with_retransformed_trust(role_factor(role, policy));
        let id = transformed.id.clone();
        if state.e.insert(transformed) {
            evidence_added.push(id);
        }
    }

    let (agg, note) = recompute_nu_raw(&mut state, context, provider, policy, now);
    apply_conflict_update(&mut state, agg.conflict, policy, now);

    state.m.last_modified_time = now;
    state.m.history.push("Incorporate".to_string());

    if let Some(invariant) = check_invariants(&state, policy) {
        return Err(OperatorError::InvariantViolation {
            operator_name: "Incorporate",
            invariant,
            before_nu_raw: before.nu_raw,
            before_nu: before.nu(policy.penalty_mode),
        });
    }

    let notes = note.unwrap_or_default();
    let rec = record(
        "Incorporate",
        now,
        &before,
        &state,
        policy.penalty_mode,
        evidence_added,
        notes,
    );
    Ok((state, rec))
}
