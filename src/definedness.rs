//! Definedness providers: Def_sem (pluggable), Def_ep/Def_proc (aggregator
//! output), and their convex combination into `Def` (§4.4).

use std::fmt;

use crate::context::Context;
use crate::policy::Policy;
use crate::state::State;

/// Tag keys the default semantic-definedness provider reads from
/// `state.m.tags` (§4.4).
pub mod tags {
    pub const ONTOLOGY_COVERAGE: &str = "ontology_coverage";
    pub const AMBIGUITY: &str = "ambiguity";
    pub const CONSTRAINT_COVERAGE: &str = "constraint_coverage";
    pub const BOUNDARY_PRECISION: &str = "boundary_precision";
}

/// `semantic_definedness(state, context) -> [0, 1]` (§6). The only
/// definedness provider that is pluggable — Def_ep and Def_proc are always
/// computed from the aggregator (§4.3).
pub trait SemanticDefinednessProvider: fmt::Debug {
    fn semantic_definedness(&self, state: &State, context: &Context) -> f64;
}

/// Mean of the four sub-scores the state tracks as metadata tags (§4.4).
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSemanticProvider;

impl SemanticDefinednessProvider for DefaultSemanticProvider {
    fn semantic_definedness(&self, state: &State, _context: &Context) -> f64 {
        let ontology_coverage = state.m.tag(tags::ONTOLOGY_COVERAGE);
        let clarity = 1.0 - state.m.tag(tags::AMBIGUITY);
        let constraint_coverage = state.m.tag(tags::CONSTRAINT_COVERAGE);
        let boundary_precision = state.m.tag(tags::BOUNDARY_PRECISION);
        (ontology_coverage + clarity + constraint_coverage + boundary_precision) / 4.0
    }
}

/// A provider's output clamped into `[0, 1]`, with a flag marking whether
/// clamping was necessary (§7 provider-failure: never fatal, always clamped).
pub struct ClampedDef {
    pub value: f64,
    pub was_clamped: bool,
}

pub fn clamp_def(raw: f64) -> ClampedDef {
    let value = raw.clamp(0.0, 1.0);
    ClampedDef {
        value,
        was_clamped: (value - raw).abs() > f64::EPSILON,
    }
}

/// `Def = w_sem * Def_sem + w_ep * Def_ep + w_proc * Def_proc` (§4.4).
pub fn combine_def(def_sem: f64, def_ep: f64, def_proc: f64, policy: &Policy) -> f64 {
    policy.w_sem * def_sem + policy.w_ep * def_ep + policy.w_proc * def_proc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Timestamp;
    use crate::context::TimeInterval;
    use crate::evidence::DedupMode;
    use crate::ids::{ContextID, TargetID};

    fn ts(secs: i64) -> Timestamp {
        Timestamp::new(chrono::DateTime::from_timestamp(secs, 0).unwrap())
    }

    #[test]
    fn fresh_state_has_zero_semantic_definedness() {
        let state = State::initial(TargetID::new("t"), ContextID::new("k"), ts(0), DedupMode::Strict);
        let ctx = Context::new(ContextID::new("k"), TimeInterval::from(ts(0)), "p");
        let provider = DefaultSemanticProvider;
        assert_eq!(provider.semantic_definedness(&state, &ctx), 0.0);
    }

    #[test]
    fn tags_raise_semantic_definedness() {
        let mut state = State::initial(TargetID::new("t"), ContextID::new("k"), ts(0), DedupMode::Strict);
        state.m.tags.insert(tags::ONTOLOGY_COVERAGE.into(), 1.0);
        state.m.tags.insert(tags::CONSTRAINT_COVERAGE.into(), 1.0);
        state.m.tags.insert(tags::BOUNDARY_PRECISION.into(), 1.0);
        // ambiguity left at 0 -> clarity = 1.0
        let ctx = Context::new(ContextID::new("k"), TimeInterval::from(ts(0)), "p");
        let provider = DefaultSemanticProvider;
        assert_eq!(provider.semantic_definedness(&state, &ctx), 1.0);
    }

    #[test]
    fn clamp_def_flags_out_of_range_values() {
        let clamped = clamp_def(1.2);
        assert_eq!(clamped.value, 1.0);
        assert!(clamped.was_clamped);

        let not_clamped = clamp_def(0.5);
        assert_eq!(not_clamped.value, 0.5);
        assert!(!not_clamped.was_clamped);
    }

    #[test]
    fn combine_def_is_weighted_average() {
        let policy = Policy::default();
        let def = combine_def(1.0, 1.0, 1.0, &policy);
        assert!((def - 1.0).abs() < 1e-9);
        let def_zero = combine_def(0.0, 0.0, 0.0, &policy);
        assert_eq!(def_zero, 0.0);
    }
}
