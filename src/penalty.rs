//! Penalty sources and the combination rule that folds them into ν.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Closed set of situational penalty sources (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PenaltySource {
    Conflict,
    ScopeExpansion,
    MergeRupture,
    CategoryError,
    Manual,
}

impl std::fmt::Display for PenaltySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict => write!(f, "conflict"),
            Self::ScopeExpansion => write!(f, "scope_expansion"),
            Self::MergeRupture => write!(f, "merge_rupture"),
            Self::CategoryError => write!(f, "category_error"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// How the policy folds multiple penalty contributions into one ν adjustment
/// (§3 policy table `penalty_mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PenaltyMode {
    /// The single largest contribution dominates.
    Max,
    /// Contributions sum, bounded at 1.0.
    Sum,
}

impl Default for PenaltyMode {
    fn default() -> Self {
        Self::Max
    }
}

/// `ν_penalties: PenaltySource -> [0, 1]`. Absent keys contribute 0 (§3).
pub type PenaltyMap = BTreeMap<PenaltySource, f64>;

/// Fold a penalty map into a single adjustment in `[0, 1]` per the policy's
/// `penalty_mode` (I1).
pub fn combine(penalties: &PenaltyMap, mode: PenaltyMode) -> f64 {
    match mode {
        PenaltyMode::Max => penalties.values().copied().fold(0.0_f64, f64::max),
        PenaltyMode::Sum => penalties.values().sum::<f64>().min(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_mode_takes_the_largest_contribution() {
        let mut penalties = PenaltyMap::new();
        penalties.insert(PenaltySource::Conflict, 0.2);
        penalties.insert(PenaltySource::ScopeExpansion, 0.05);
        assert_eq!(combine(&penalties, PenaltyMode::Max), 0.2);
    }

    #[test]
    fn sum_mode_bounds_at_one() {
        let mut penalties = PenaltyMap::new();
        penalties.insert(PenaltySource::Conflict, 0.6);
        penalties.insert(PenaltySource::MergeRupture, 0.6);
        assert_eq!(combine(&penalties, PenaltyMode::Sum), 1.0);
    }

    #[test]
    fn empty_map_contributes_zero() {
        let penalties = PenaltyMap::new();
        assert_eq!(combine(&penalties, PenaltyMode::Max), 0.0);
        assert_eq!(combine(&penalties, PenaltyMode::Sum), 0.0);
    }
}
