//! PenaltyDecay: geometric decay of penalties toward removal, quantised into
//! discrete steps for determinism under a mocked clock (§4.6, §9).

use crate::clock::{Clock, Timestamp};
use crate::penalty::PenaltySource;
use crate::policy::Policy;
use crate::record::RefinementRecord;
use crate::state::State;

use super::{check_invariants, record, OperatorError, OperatorResult};

/// A penalty value below this is indistinguishable from zero and is removed.
const REMOVAL_THRESHOLD: f64 = 1e-6;

fn step_size(policy: &Policy) -> std::time::Duration {
    policy.penalty_clear_window / policy.penalty_clear_steps
}

fn decayed_value(old: f64, elapsed: chrono::TimeDelta, policy: &Policy) -> Option<f64> {
    let step_ms = step_size(policy).as_millis().max(1) as i64;
    let elapsed_ms = elapsed.num_milliseconds().max(0);
    let steps = (elapsed_ms / step_ms) as u32;
    if steps == 0 {
        return Some(old);
    }
    let value = old * policy.penalty_decay_factor.powi(steps as i32);
    if value < REMOVAL_THRESHOLD {
        None
    } else {
        Some(value)
    }
}

/// `PenaltyDecay(state, policy, clock)` (§4.6).
///
/// The conflict penalty only decays once `m.penalty_clear_start` has been set
/// by [`super::conflict`] observing conflict fall below `θ_conflict_clear`.
/// Every other penalty source decays unconditionally (while
/// `penalty_decay_enabled`), measured against `last_modified_time`.
pub fn penalty_decay(
    mut state: State,
    policy: &Policy,
    clock: &dyn Clock,
) -> OperatorResult<(State, RefinementRecord)> {
    let before = state.clone();
    let now = clock.now();

    if !policy.penalty_decay_enabled {
        let rec = record(
            "PenaltyDecay",
            now,
            &before,
            &state,
            policy.penalty_mode,
            Vec::new(),
            "penalty decay disabled by policy",
        );
        return Ok((state, rec));
    }

    let mut to_remove = Vec::new();
    let mut next_values: Vec<(PenaltySource, f64)> = Vec::new();

    for (&source, &value) in state.nu_penalties.iter() {
        let elapsed = match source {
            PenaltySource::Conflict => match state.m.penalty_clear_start {
                Some(start) => now.since(start),
                None => continue,
            },
            _ => now.since(state.m.last_modified_time),
        };
        match decayed_value(value, elapsed, policy) {
            Some(new_value) if (new_value - value).abs() > f64::EPSILON => next_values.push((source, new_value)),
            Some(_) => {}
            None => to_remove.push(source),
        }
    }

    for (source, value) in next_values {
        state.nu_penalties.insert(source, value);
    }
    for source in &to_remove {
        state.nu_penalties.remove(source);
    }
    if to_remove.contains(&PenaltySource::Conflict) {
        state.m.penalty_clear_start = None;
    }

    state.m.last_modified_time = now;
    state.m.history.push("PenaltyDecay".to_string());

    if let Some(invariant) = check_invariants(&state, policy) {
        return Err(OperatorError::InvariantViolation {
            operator_name: "PenaltyDecay",
            invariant,
            before_nu_raw: before.nu_raw,
            before_nu: before.nu(policy.penalty_mode),
        });
    }

    let rec = record(
        "PenaltyDecay",
        now,
        &before,
        &state,
        policy.penalty_mode,
        Vec::new(),
        String::new(),
    );
    Ok((state, rec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::evidence::DedupMode;
    use crate::ids::{ContextID, TargetID};

    fn ts(secs: i64) -> Timestamp {
        Timestamp::new(chrono::DateTime::from_timestamp(secs, 0).unwrap())
    }

    fn policy_with_window(window_secs: u64, steps: u32, factor: f64) -> Policy {
        Policy::builder()
            .penalty_clear_window(std::time::Duration::from_secs(window_secs))
            .penalty_clear_steps(steps)
            .penalty_decay_factor(factor)
            .build()
            .unwrap()
    }

    #[test]
    fn conflict_penalty_does_not_decay_without_clear_start() {
        let mut state = State::initial(TargetID::new("t"), ContextID::new("k"), ts(0), DedupMode::Strict);
        state.nu_penalties.insert(PenaltySource::Conflict, 0.2);
        let policy = policy_with_window(240, 24, 0.5);
        let clock = MockClock::new();
        clock.advance(chrono::TimeDelta::seconds(1000));
        let (state, _) = penalty_decay(state, &policy, &clock).unwrap();
        assert_eq!(state.nu_penalties[&PenaltySource::Conflict], 0.2);
    }

    #[test]
    fn conflict_penalty_decays_once_clear_start_is_set() {
        let mut state = State::initial(TargetID::new("t"), ContextID::new("k"), ts(0), DedupMode::Strict);
        state.nu_penalties.insert(PenaltySource::Conflict, 0.2);
        state.m.penalty_clear_start = Some(ts(0));
        let policy = policy_with_window(240, 24, 0.5); // step_size = 10s
        let clock = MockClock::new();
        clock.advance(chrono::TimeDelta::seconds(10));
        let (state, _) = penalty_decay(state, &policy, &clock).unwrap();
        assert!((state.nu_penalties[&PenaltySource::Conflict] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn non_conflict_penalty_decays_unconditionally() {
        let mut state = State::initial(TargetID::new("t"), ContextID::new("k"), ts(0), DedupMode::Strict);
        state.nu_penalties.insert(PenaltySource::ScopeExpansion, 0.2);
        let policy = policy_with_window(240, 24, 0.5);
        let clock = MockClock::new();
        clock.advance(chrono::TimeDelta::seconds(10));
        let (state, _) = penalty_decay(state, &policy, &clock).unwrap();
        assert!((state.nu_penalties[&PenaltySource::ScopeExpansion] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn penalty_below_threshold_is_removed() {
        let mut state = State::initial(TargetID::new("t"), ContextID::new("k"), ts(0), DedupMode::Strict);
        state.nu_penalties.insert(PenaltySource::Conflict, 1e-5);
        state.m.penalty_clear_start = Some(ts(0));
        let policy = policy_with_window(240, 24, 0.5);
        let clock = MockClock::new();
        clock.advance(chrono::TimeDelta::seconds(100));
        let (state, _) = penalty_decay(state, &policy, &clock).unwrap();
        assert!(!state.nu_penalties.contains_key(&PenaltySource::Conflict));
        assert!(state.m.penalty_clear_start.is_none());
    }

    #[test]
    fn disabled_decay_leaves_penalties_untouched() {
        let mut state = State::initial(TargetID::new("t"), ContextID::new("k"), ts(0), DedupMode::Strict);
        state.nu_penalties.insert(PenaltySource::ScopeExpansion, 0.2);
        let policy = Policy::builder().penalty_decay_enabled(false).build().unwrap();
        let clock = MockClock::new();
        clock.advance(chrono::TimeDelta::seconds(1_000_000));
        let (state, _) = penalty_decay(state, &policy, &clock).unwrap();
        assert_eq!(state.nu_penalties[&PenaltySource::ScopeExpansion], 0.2);
    }
}
