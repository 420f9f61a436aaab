//! QueryNext: rank (target, context) pairs for refinement priority (§4.6).

use crate::ids::StateKey;
use crate::policy::Policy;
use crate::state::Sigma;

/// `QueryNext(Σ, policy)`: keys sorted by ν descending, then ν_raw
/// descending, then `last_modified_time` ascending (oldest first).
pub fn query_next(sigma: &Sigma, policy: &Policy) -> Vec<StateKey> {
    let mut ranked: Vec<_> = sigma
        .values()
        .map(|state| (state.key(), state.nu(policy.penalty_mode), state.nu_raw, state.m.last_modified_time))
        .collect();

    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap()
            .then_with(|| b.2.partial_cmp(&a.2).unwrap())
            .then_with(|| a.3.cmp(&b.3))
    });

    ranked.into_iter().map(|(key, ..)| key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Timestamp;
    use crate::evidence::DedupMode;
    use crate::ids::{ContextID, TargetID};
    use crate::state::State;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::new(chrono::DateTime::from_timestamp(secs, 0).unwrap())
    }

    #[test]
    fn ranks_by_nu_descending() {
        let mut sigma = Sigma::new();
        let mut high = State::initial(TargetID::new("a"), ContextID::new("k"), ts(0), DedupMode::Strict);
        high.nu_raw = 0.9;
        let mut low = State::initial(TargetID::new("b"), ContextID::new("k"), ts(0), DedupMode::Strict);
        low.nu_raw = 0.1;
        sigma.insert(high.key(), high);
        sigma.insert(low.key(), low);

        let policy = Policy::default();
        let ranked = query_next(&sigma, &policy);
        assert_eq!(ranked[0], StateKey::new(TargetID::new("a"), ContextID::new("k")));
        assert_eq!(ranked[1], StateKey::new(TargetID::new("b"), ContextID::new("k")));
    }

    #[test]
    fn ties_break_on_nu_raw_then_oldest_first() {
        let mut sigma = Sigma::new();
        let mut a = State::initial(TargetID::new("a"), ContextID::new("k"), ts(0), DedupMode::Strict);
        a.nu_raw = 0.5;
        a.m.last_modified_time = ts(100);
        let mut b = State::initial(TargetID::new("b"), ContextID::new("k"), ts(0), DedupMode::Strict);
        b.nu_raw = 0.5;
        b.m.last_modified_time = ts(10);
        sigma.insert(a.key(), a);
        sigma.insert(b.key(), b);

        let policy = Policy::default();
        let ranked = query_next(&sigma, &policy);
        assert_eq!(ranked[0], StateKey::new(TargetID::new("b"), ContextID::new("k")));
        assert_eq!(ranked[1], StateKey::new(TargetID::new("a"), ContextID::new("k")));
    }

    #[test]
    fn empty_sigma_yields_empty_ranking() {
        let sigma = Sigma::new();
        let policy = Policy::default();
        assert!(query_next(&sigma, &policy).is_empty());
    }
}
