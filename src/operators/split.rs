//! Split: fan a parent state out into fresh children over the same evidence,
//! each starting with a clean penalty slate (§4.6).

use std::sync::Arc;

use crate::clock::Clock;
use crate::context::Context;
use crate::definedness::SemanticDefinednessProvider;
use crate::ids::TargetID;
use crate::penalty::PenaltyMap;
use crate::policy::Policy;
use crate::record::RefinementRecord;
use crate::relevance::RelevanceFn;
use crate::state::{Metadata, State};

use super::{check_invariants, record, recompute_nu_raw, OperatorError, OperatorResult};

/// One child to split off: a new target sharing the parent's evidence, with
/// an optional relevance function overriding the policy default for that
/// child's own re-aggregation.
#[derive(Clone)]
pub struct ChildSpec {
    pub target_id: TargetID,
    pub relevance_override: Option<Arc<dyn RelevanceFn>>,
}

impl ChildSpec {
    pub fn new(target_id: TargetID) -> Self {
        Self {
            target_id,
            relevance_override: None,
        }
    }

    pub fn with_relevance_override(mut self, relevance_fn: Arc<dyn RelevanceFn>) -> Self {
        self.relevance_override = Some(relevance_fn);
        self
    }
}

/// `Split(parent_state, children_specs, policy, clock)` (§4.6). Returns one
/// `(State, RefinementRecord)` pair per child, in the order the specs were
/// given.
pub fn split(
    parent: State,
    context: &Context,
    children: Vec<ChildSpec>,
    provider: &dyn SemanticDefinednessProvider,
    policy: &Policy,
    clock: &dyn Clock,
) -> OperatorResult<Vec<(State, RefinementRecord)>> {
    if children.is_empty() {
        return Err(OperatorError::SplitZeroChildren);
    }

    let now = clock.now();
    let parent_key = parent.key();
    let mut out = Vec::with_capacity(children.len());

    for spec in children.into_iter() {
        let child_policy = match &spec.relevance_override {
            Some(relevance_fn) => {
                let mut p = policy.clone();
                p.relevance_fn = relevance_fn.clone();
                p
            }
            None => policy.clone(),
        };

        let mut tags = parent.m.tags.clone();
        tags.insert(
            "relevance_override_active".to_string(),
            if spec.relevance_override.is_some() { 1.0 } else { 0.0 },
        );

        let mut child = State {
            t: spec.target_id,
            k: parent.k.clone(),
            nu_raw: parent.nu_raw,
            nu_penalties: PenaltyMap::new(),
            e: parent.e.clone(),
            m: Metadata {
                creation_time: now,
                last_modified_time: now,
                history: vec![format!("Split(parent={parent_key})")],
                crossings: Vec::new(),
                conflict_last_applied: None,
                penalty_clear_start: None,
                tags,
            },
        };

        let before = child.clone();
        let (_, note) = recompute_nu_raw(&mut child, context, provider, &child_policy, now);

        if let Some(invariant) = check_invariants(&child, policy) {
            return Err(OperatorError::InvariantViolation {
                operator_name: "Split",
                invariant,
                before_nu_raw: parent.nu_raw,
                before_nu: parent.nu(policy.penalty_mode),
            });
        }

        let rec = record(
            "Split",
            now,
            &before,
            &child,
            policy.penalty_mode,
            Vec::new(),
            note.unwrap_or_default(),
        );
        out.push((child, rec));
    }

    Ok(out)
}
