//! Licensing query: does a state's ν/ν_raw authorise downstream truth
//! evaluation (§4.7)? Distinct from [`crate::operators::query_next`], which
//! ranks states for refinement priority rather than gating evaluation.

use serde::{Deserialize, Serialize};

use crate::policy::Policy;
use crate::state::State;

/// Why a licensing query resolved the way it did (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseReason {
    Licensed,
    StructurallyVague,
    PenaltyBlock,
    NullClassified,
}

/// The outcome of [`query`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub licensed: bool,
    pub nu_raw: f64,
    pub nu: f64,
    pub reason: LicenseReason,
}

/// `query(state, policy)` (§4.7).
///
/// `reason = null_classified` shadows every other reason once `ν ≥ θ_null`;
/// otherwise licensing follows the ν_raw/ν threshold pair.
pub fn query(state: &State, policy: &Policy) -> QueryResult {
    let nu_raw = state.nu_raw;
    let nu = state.nu(policy.penalty_mode);

    let reason = if nu >= policy.theta_null {
        LicenseReason::NullClassified
    } else if nu_raw > policy.theta_eval_raw {
        LicenseReason::StructurallyVague
    } else if nu > policy.theta_eval {
        LicenseReason::PenaltyBlock
    } else {
        LicenseReason::Licensed
    };

    let licensed = nu_raw <= policy.theta_eval_raw && nu <= policy.theta_eval;

    QueryResult {
        licensed,
        nu_raw,
        nu,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Timestamp;
    use crate::evidence::DedupMode;
    use crate::ids::{ContextID, TargetID};

    fn ts(secs: i64) -> Timestamp {
        Timestamp::new(chrono::DateTime::from_timestamp(secs, 0).unwrap())
    }

    fn state_with(nu_raw: f64) -> State {
        let mut state = State::initial(TargetID::new("t"), ContextID::new("k"), ts(0), DedupMode::Strict);
        state.nu_raw = nu_raw;
        state
    }

    #[test]
    fn low_nu_raw_and_nu_is_licensed() {
        let policy = Policy::default();
        let state = state_with(0.2);
        let result = query(&state, &policy);
        assert!(result.licensed);
        assert_eq!(result.reason, LicenseReason::Licensed);
    }

    #[test]
    fn high_nu_raw_is_structurally_vague_regardless_of_nu() {
        let policy = Policy::default();
        let state = state_with(0.6); // > theta_eval_raw (0.5)
        let result = query(&state, &policy);
        assert!(!result.licensed);
        assert_eq!(result.reason, LicenseReason::StructurallyVague);
    }

    #[test]
    fn low_nu_raw_but_penalty_pushed_nu_high_is_penalty_block() {
        let policy = Policy::default();
        let mut state = state_with(0.3); // <= theta_eval_raw (0.5)
        state
            .nu_penalties
            .insert(crate::penalty::PenaltySource::Manual, 0.5); // nu -> 0.8 > theta_eval (0.4)
        let result = query(&state, &policy);
        assert!(!result.licensed);
        assert_eq!(result.reason, LicenseReason::PenaltyBlock);
    }

    #[test]
    fn nu_above_theta_null_shadows_other_reasons() {
        let policy = Policy::default();
        let state = state_with(0.9); // nu_raw high AND nu >= theta_null (0.7)
        let result = query(&state, &policy);
        assert!(!result.licensed);
        assert_eq!(result.reason, LicenseReason::NullClassified);
    }
}
