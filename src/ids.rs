//! Opaque identifiers for the definedness calculus.
//!
//! `TargetID`, `ContextID`, `AgentID` are caller-supplied opaque strings.
//! `EvidenceID` is the odd one out: it is *derived*, never chosen by the
//! caller, from the content of the evidence item (see [`crate::evidence`]).

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($name:ident, $prefix:literal) => {
        /// Opaque, caller-supplied identifier. Equality is exact string equality.
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap any string-like value as an identifier.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Borrow the underlying string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}:{}", $prefix, self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self::new(raw)
            }
        }
    };
}

opaque_id!(TargetID, "target");
opaque_id!(ContextID, "ctx");
opaque_id!(AgentID, "agent");
opaque_id!(EvidenceID, "ev");

/// A (target, context) pair — the key into the information state Σ.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateKey {
    pub target: TargetID,
    pub context: ContextID,
}

impl StateKey {
    pub fn new(target: TargetID, context: ContextID) -> Self {
        Self { target, context }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.target, self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_compare_by_exact_string_value() {
        assert_eq!(TargetID::new("a"), TargetID::new("a"));
        assert_ne!(TargetID::new("a"), TargetID::new("b"));
    }

    #[test]
    fn display_includes_kind_prefix() {
        assert_eq!(format!("{}", TargetID::new("foo")), "target:foo");
        assert_eq!(format!("{}", ContextID::new("bar")), "ctx:bar");
    }

    #[test]
    fn state_key_is_hashable_and_orderable() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(StateKey::new(TargetID::new("t"), ContextID::new("k")));
        assert!(set.contains(&StateKey::new(TargetID::new("t"), ContextID::new("k"))));
    }
}
