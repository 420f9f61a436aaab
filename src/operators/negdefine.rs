//! NegDefine: synthesize definitional constraints, raise `constraint_coverage`,
//! recompute ν_raw (§4.6).

use crate::clock::Clock;
use crate::context::Context;
use crate::definedness::{tags, SemanticDefinednessProvider};
use crate::evidence::{EvidenceItem, EvidenceKind};
use crate::ids::{AgentID, EvidenceID};
use crate::policy::Policy;
use crate::record::RefinementRecord;
use crate::state::State;

use super::{check_invariants, record, recompute_nu_raw, OperatorError, OperatorResult};

/// Sentinel agent attributed to constraints with no caller-supplied source.
pub const SYSTEM_AGENT: &str = "system";

/// One definitional constraint to add. `src` defaults to the sentinel system
/// agent when absent.
#[derive(Debug, Clone)]
pub struct ConstraintSpec {
    pub claim: String,
    pub src: Option<AgentID>,
}

impl ConstraintSpec {
    pub fn new(claim: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
            src: None,
        }
    }

    pub fn with_src(mut self, src: AgentID) -> Self {
        self.src = Some(src);
        self
    }
}

/// `NegDefine(state, constraints, policy, clock)` (§4.6).
pub fn negdefine(
    mut state: State,
    context: &Context,
    constraints: Vec<ConstraintSpec>,
    provider: &dyn SemanticDefinednessProvider,
    policy: &Policy,
    clock: &dyn Clock,
) -> OperatorResult<(State, RefinementRecord)> {
    let before = state.clone();
    let now = clock.now();

    let mut evidence_added: Vec<EvidenceID> = Vec::new();
    for constraint in constraints {
        let src = constraint.src.unwrap_or_else(|| AgentID::new(SYSTEM_AGENT));
        let item = EvidenceItem::new(EvidenceKind::Definitional, constraint.claim, 0.0, src, now, 1.0, 1.0)
            .expect("synthesized NegDefine evidence is always well-formed");
        let id = item.id.clone();
        if state.e.insert(item) {
            evidence_added.push(id);
            let raised = (state.m.tag(tags::CONSTRAINT_COVERAGE) + policy.negdefine_constraint_increment).min(1.0);
            state.m.tags.insert(tags::CONSTRAINT_COVERAGE.to_string(), raised);
        }
    }

    let (_, note) = recompute_nu_raw(&mut state, context, provider, policy, now);

    state.m.last_modified_time = now;
    state.m.history.push("NegDefine".to_string());

    if let Some(invariant) = check_invariants(&state, policy) {
        return Err(OperatorError::InvariantViolation {
            operator_name: "NegDefine",
            invariant,
            before_nu_raw: before.nu_raw,
            before_nu: before.nu(policy.penalty_mode),
        });
    }

    let rec = record(
        "NegDefine",
        now,
        &before,
        &state,
        policy.penalty_mode,
        evidence_added,
        note.unwrap_or_default(),
    );
    Ok((state, rec))
}
