//! Errors specific to the refinement operators (§7).

use miette::Diagnostic;
use thiserror::Error;

use crate::ids::{ContextID, TargetID};

/// Errors an operator can raise. Provider-failure (§7) is deliberately
/// absent here: an out-of-range semantic-definedness value is clamped and
/// noted on the `RefinementRecord`, never propagated as an error.
#[derive(Debug, Error, Diagnostic)]
pub enum OperatorError {
    #[error("invariant {invariant} violated after {operator_name}: before nu_raw={before_nu_raw}, nu={before_nu}")]
    #[diagnostic(
        code(nu::operators::invariant_violation),
        help(
            "This indicates a defect in the engine itself, not caller misuse. \
             The pre-operator state is unaffected; file a bug report with the \
             operator name and inputs."
        )
    )]
    InvariantViolation {
        operator_name: &'static str,
        invariant: &'static str,
        before_nu_raw: f64,
        before_nu: f64,
    },

    #[error("Merge requires both states to share a target, got {a} and {b}")]
    #[diagnostic(
        code(nu::operators::merge_target_mismatch),
        help("Merge combines two contexts' views of the *same* target. Recontextualize one side first if the targets genuinely differ.")
    )]
    MergeTargetMismatch { a: TargetID, b: TargetID },

    #[error("Recontextualize to the same context {context} is a no-op, not a valid transition")]
    #[diagnostic(
        code(nu::operators::recontextualize_identical_context),
        help("Pick a destination context distinct from the state's current context.")
    )]
    RecontextualizeIdenticalContext { context: ContextID },

    #[error("Split requires at least one child spec, got 0")]
    #[diagnostic(
        code(nu::operators::split_zero_children),
        help("Provide one or more child target specs to Split.")
    )]
    SplitZeroChildren,
}

pub type OperatorResult<T> = std::result::Result<T, OperatorError>;
