//! Rich diagnostic error types for the nu-calculus engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so callers know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

pub use crate::evidence::EvidenceError;
pub use crate::operators::OperatorError;
pub use crate::policy::PolicyError;

/// Top-level error type for the nu-calculus engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum NuError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Evidence(#[from] EvidenceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Operator(#[from] OperatorError),
}

/// Convenience alias for functions returning nu-calculus results.
pub type NuResult<T> = std::result::Result<T, NuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_error_converts_to_nu_error() {
        let err = PolicyError::WeightsDoNotSumToOne { sum: 0.8 };
        let nu: NuError = err.into();
        assert!(matches!(nu, NuError::Policy(PolicyError::WeightsDoNotSumToOne { .. })));
    }

    #[test]
    fn evidence_error_converts_to_nu_error() {
        let err = EvidenceError::ValenceOutOfRange { valence: 2.0 };
        let nu: NuError = err.into();
        assert!(matches!(nu, NuError::Evidence(EvidenceError::ValenceOutOfRange { .. })));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = PolicyError::WeightsDoNotSumToOne { sum: 0.8 };
        let msg = format!("{err}");
        assert!(msg.contains("0.8"));
    }
}
