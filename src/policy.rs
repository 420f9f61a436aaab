//! The policy record: thresholds, weights, and pluggable knobs governing the
//! engine (§3 policy table, §11 configuration).

use std::sync::Arc;
use std::time::Duration;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::penalty::PenaltyMode;
use crate::relevance::{RelevanceFn, UniformRelevance};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised when a policy is malformed (§7 invalid-policy).
#[derive(Debug, Error, Diagnostic, PartialEq)]
pub enum PolicyError {
    #[error("weights w_sem + w_ep + w_proc = {sum}, must equal 1.0")]
    #[diagnostic(
        code(nu::policy::weights_not_normalized),
        help("Def is a convex combination of Def_sem, Def_ep, Def_proc; the weights must sum to exactly 1.0.")
    )]
    WeightsDoNotSumToOne { sum: f64 },

    #[error("threshold `{field}` = {value} is out of range [0, 1]")]
    #[diagnostic(
        code(nu::policy::threshold_out_of_range),
        help("All ν/Def thresholds are probabilities and must lie in [0, 1].")
    )]
    ThresholdOutOfRange { field: &'static str, value: f64 },

    #[error("duration `{field}` must be positive, got {value:?}")]
    #[diagnostic(
        code(nu::policy::non_positive_duration),
        help("Cooldowns and decay windows must be positive durations.")
    )]
    NonPositiveDuration { field: &'static str, value: Duration },

    #[error("malformed policy document: {message}")]
    #[diagnostic(
        code(nu::policy::parse_error),
        help("Check the TOML document against the Policy field table in the crate documentation.")
    )]
    ParseError { message: String },
}

pub type PolicyResult<T> = std::result::Result<T, PolicyError>;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Thresholds, weights, and pluggable knobs governing every operator and
/// the licensing query. Construct via [`Policy::builder`] or
/// [`Policy::default`]; both paths validate before returning a `Policy`.
#[derive(Clone)]
pub struct Policy {
    pub theta_eval: f64,
    pub theta_eval_raw: f64,
    pub theta_null: f64,
    pub theta_defined: f64,
    pub theta_conflict: f64,
    pub theta_conflict_clear: f64,
    pub w_sem: f64,
    pub w_ep: f64,
    pub w_proc: f64,
    pub max_conflict_penalty: f64,
    pub conflict_cooldown: Duration,
    pub penalty_mode: PenaltyMode,
    pub penalty_decay_enabled: bool,
    pub penalty_decay_factor: f64,
    pub penalty_clear_window: Duration,
    pub penalty_clear_steps: u32,
    pub not_i_trust_factor: f64,
    pub coalition_factor: f64,
    pub unknown_trust_factor: f64,
    pub negdefine_constraint_increment: f64,
    pub dedup_mode: crate::evidence::DedupMode,
    /// Half-life for the evidence-age decay curve used by the aggregator
    /// (§4.3, §9 open question: the decay function shape is left open by
    /// the source spec and made policy-configurable here).
    pub evidence_half_life: Duration,
    pub relevance_fn: Arc<dyn RelevanceFn>,
}

impl std::fmt::Debug for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Policy")
            .field("theta_eval", &self.theta_eval)
            .field("theta_eval_raw", &self.theta_eval_raw)
            .field("theta_null", &self.theta_null)
            .field("theta_defined", &self.theta_defined)
            .field("theta_conflict", &self.theta_conflict)
            .field("theta_conflict_clear", &self.theta_conflict_clear)
            .field("w_sem", &self.w_sem)
            .field("w_ep", &self.w_ep)
            .field("w_proc", &self.w_proc)
            .field("max_conflict_penalty", &self.max_conflict_penalty)
            .field("conflict_cooldown", &self.conflict_cooldown)
            .field("penalty_mode", &self.penalty_mode)
            .field("penalty_decay_enabled", &self.penalty_decay_enabled)
            .field("penalty_decay_factor", &self.penalty_decay_factor)
            .field("penalty_clear_window", &self.penalty_clear_window)
            .field("dedup_mode", &self.dedup_mode)
            .field("evidence_half_life", &self.evidence_half_life)
            .finish_non_exhaustive()
    }
}

impl Policy {
    /// Start building a policy from the defaults in §3.
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    fn validate(&self) -> PolicyResult<()> {
        let sum = self.w_sem + self.w_ep + self.w_proc;
        if (sum - 1.0).abs() > 1e-9 {
            return Err(PolicyError::WeightsDoNotSumToOne { sum });
        }
        for (field, value) in [
            ("theta_eval", self.theta_eval),
            ("theta_eval_raw", self.theta_eval_raw),
            ("theta_null", self.theta_null),
            ("theta_defined", self.theta_defined),
            ("theta_conflict", self.theta_conflict),
            ("theta_conflict_clear", self.theta_conflict_clear),
            ("max_conflict_penalty", self.max_conflict_penalty),
            ("penalty_decay_factor", self.penalty_decay_factor),
            ("not_i_trust_factor", self.not_i_trust_factor),
            ("coalition_factor", self.coalition_factor),
            ("unknown_trust_factor", self.unknown_trust_factor),
            ("negdefine_constraint_increment", self.negdefine_constraint_increment),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PolicyError::ThresholdOutOfRange { field, value });
            }
        }
        if self.conflict_cooldown.is_zero() {
            return Err(PolicyError::NonPositiveDuration {
                field: "conflict_cooldown",
                value: self.conflict_cooldown,
            });
        }
        if self.penalty_clear_window.is_zero() {
            return Err(PolicyError::NonPositiveDuration {
                field: "penalty_clear_window",
                value: self.penalty_clear_window,
            });
        }
        if self.penalty_clear_steps == 0 {
            return Err(PolicyError::NonPositiveDuration {
                field: "penalty_clear_steps",
                value: Duration::ZERO,
            });
        }
        Ok(())
    }

    /// Load a policy from a TOML document, merging onto the default
    /// numeric/enum fields and validating once at load time (§11).
    pub fn from_toml_str(toml_src: &str) -> PolicyResult<Policy> {
        let doc: PolicyToml =
            toml::from_str(toml_src).map_err(|e| PolicyError::ParseError {
                message: e.to_string(),
            })?;
        doc.into_policy()
    }

    /// Load a policy from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> PolicyResult<Policy> {
        let src = std::fs::read_to_string(path.as_ref()).map_err(|e| PolicyError::ParseError {
            message: format!("{}: {e}", path.as_ref().display()),
        })?;
        Self::from_toml_str(&src)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Policy::builder()
            .build()
            .expect("default policy must be valid")
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`Policy`], pre-populated with the defaults from §3.
pub struct PolicyBuilder {
    inner: Policy,
}

impl Default for PolicyBuilder {
    fn default() -> Self {
        Self {
            inner: Policy {
                theta_eval: 0.4,
                theta_eval_raw: 0.5,
                theta_null: 0.7,
                theta_defined: 0.3,
                theta_conflict: 0.3,
                theta_conflict_clear: 0.15,
                w_sem: 0.4,
                w_ep: 0.35,
                w_proc: 0.25,
                max_conflict_penalty: 0.2,
                conflict_cooldown: Duration::from_secs(3600),
                penalty_mode: PenaltyMode::Max,
                penalty_decay_enabled: true,
                penalty_decay_factor: 0.9,
                penalty_clear_window: Duration::from_secs(24 * 3600),
                penalty_clear_steps: 24,
                not_i_trust_factor: 0.5,
                coalition_factor: 0.75,
                unknown_trust_factor: 0.25,
                negdefine_constraint_increment: 0.1,
                dedup_mode: crate::evidence::DedupMode::Strict,
                evidence_half_life: Duration::from_secs(7 * 24 * 3600),
                relevance_fn: Arc::new(UniformRelevance),
            },
        }
    }
}

macro_rules! setter {
    ($name:ident, $field:ident, $ty:ty) => {
        pub fn $name(mut self, value: $ty) -> Self {
            self.inner.$field = value;
            self
        }
    };
}

impl PolicyBuilder {
    setter!(theta_eval, theta_eval, f64);
    setter!(theta_eval_raw, theta_eval_raw, f64);
    setter!(theta_null, theta_null, f64);
    setter!(theta_defined, theta_defined, f64);
    setter!(theta_conflict, theta_conflict, f64);
    setter!(theta_conflict_clear, theta_conflict_clear, f64);
    setter!(max_conflict_penalty, max_conflict_penalty, f64);
    setter!(conflict_cooldown, conflict_cooldown, Duration);
    setter!(penalty_mode, penalty_mode, PenaltyMode);
    setter!(penalty_decay_enabled, penalty_decay_enabled, bool);
    setter!(penalty_decay_factor, penalty_decay_factor, f64);
    setter!(penalty_clear_window, penalty_clear_window, Duration);
    setter!(penalty_clear_steps, penalty_clear_steps, u32);
    setter!(not_i_trust_factor, not_i_trust_factor, f64);
    setter!(coalition_factor, coalition_factor, f64);
    setter!(unknown_trust_factor, unknown_trust_factor, f64);
    setter!(dedup_mode, dedup_mode, crate::evidence::DedupMode);
    setter!(evidence_half_life, evidence_half_life, Duration);

    pub fn weights(mut self, w_sem: f64, w_ep: f64, w_proc: f64) -> Self {
        self.inner.w_sem = w_sem;
        self.inner.w_ep = w_ep;
        self.inner.w_proc = w_proc;
        self
    }

    pub fn relevance_fn(mut self, relevance_fn: Arc<dyn RelevanceFn>) -> Self {
        self.inner.relevance_fn = relevance_fn;
        self
    }

    pub fn build(self) -> PolicyResult<Policy> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

// ---------------------------------------------------------------------------
// TOML document (no trait-object fields; merges onto builder defaults)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
struct PolicyToml {
    theta_eval: Option<f64>,
    theta_eval_raw: Option<f64>,
    theta_null: Option<f64>,
    theta_defined: Option<f64>,
    theta_conflict: Option<f64>,
    theta_conflict_clear: Option<f64>,
    w_sem: Option<f64>,
    w_ep: Option<f64>,
    w_proc: Option<f64>,
    max_conflict_penalty: Option<f64>,
    conflict_cooldown_secs: Option<u64>,
    penalty_decay_enabled: Option<bool>,
    penalty_decay_factor: Option<f64>,
    penalty_clear_window_secs: Option<u64>,
    not_i_trust_factor: Option<f64>,
    coalition_factor: Option<f64>,
    unknown_trust_factor: Option<f64>,
    evidence_half_life_secs: Option<u64>,
}

impl PolicyToml {
    fn into_policy(self) -> PolicyResult<Policy> {
        let mut builder = Policy::builder();
        if let Some(v) = self.theta_eval {
            builder = builder.theta_eval(v);
        }
        if let Some(v) = self.theta_eval_raw {
            builder = builder.theta_eval_raw(v);
        }
        if let Some(v) = self.theta_null {
            builder = builder.theta_null(v);
        }
        if let Some(v) = self.theta_defined {
            builder = builder.theta_defined(v);
        }
        if let Some(v) = self.theta_conflict {
            builder = builder.theta_conflict(v);
        }
        if let Some(v) = self.theta_conflict_clear {
            builder = builder.theta_conflict_clear(v);
        }
        if self.w_sem.is_some() || self.w_ep.is_some() || self.w_proc.is_some() {
            let defaults = PolicyBuilder::default().inner;
            builder = builder.weights(
                self.w_sem.unwrap_or(defaults.w_sem),
                self.w_ep.unwrap_or(defaults.w_ep),
                self.w_proc.unwrap_or(defaults.w_proc),
            );
        }
        if let Some(v) = self.max_conflict_penalty {
            builder = builder.max_conflict_penalty(v);
        }
        if let Some(secs) = self.conflict_cooldown_secs {
            builder = builder.conflict_cooldown(Duration::from_secs(secs));
        }
        if let Some(v) = self.penalty_decay_enabled {
            builder = builder.penalty_decay_enabled(v);
        }
        if let Some(v) = self.penalty_decay_factor {
            builder = builder.penalty_decay_factor(v);
        }
        if let Some(secs) = self.penalty_clear_window_secs {
            builder = builder.penalty_clear_window(Duration::from_secs(secs));
        }
        if let Some(v) = self.not_i_trust_factor {
            builder = builder.not_i_trust_factor(v);
        }
        if let Some(v) = self.coalition_factor {
            builder = builder.coalition_factor(v);
        }
        if let Some(v) = self.unknown_trust_factor {
            builder = builder.unknown_trust_factor(v);
        }
        if let Some(secs) = self.evidence_half_life_secs {
            builder = builder.evidence_half_life(Duration::from_secs(secs));
        }
        builder.build()
    }
}
