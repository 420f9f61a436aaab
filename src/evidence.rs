//! Evidence items and the evidence set that aggregates them.
//!
//! An evidence item is an immutable, content-addressed fact; sets of them
//! are combined, never edited in place.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::TimeDelta;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::Timestamp;
use crate::ids::{AgentID, EvidenceID};

/// Default width of the time bucket used when deriving an [`EvidenceID`].
/// Two observations within the same bucket, with identical kind/claim/source,
/// are the same observation (§3 evidence item).
pub const DEFAULT_TIME_BUCKET: TimeDelta = TimeDelta::seconds(1);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while constructing or inserting evidence.
#[derive(Debug, Error, Diagnostic, PartialEq)]
pub enum EvidenceError {
    #[error("valence {valence} is out of range [-1, 1]")]
    #[diagnostic(
        code(nu::evidence::valence_out_of_range),
        help("Valence measures support (+) or opposition (-) for a claim; it must lie in [-1, 1].")
    )]
    ValenceOutOfRange { valence: f64 },

    #[error("trust {trust} is out of range [0, 1]")]
    #[diagnostic(
        code(nu::evidence::trust_out_of_range),
        help("Trust is a probability-like weight; it must lie in [0, 1].")
    )]
    TrustOutOfRange { trust: f64 },
}

pub type EvidenceResult<T> = std::result::Result<T, EvidenceError>;

// ---------------------------------------------------------------------------
// Evidence kind
// ---------------------------------------------------------------------------

/// Closed classification of an evidence item (§3, I5: the evidence set
/// partitions by kind into three disjoint subsets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceKind {
    /// Contributes to Def_ep via pro/con mass.
    Epistemic,
    /// Contributes to Def_sem (definitional constraints).
    Definitional,
    /// Contributes to Def_proc.
    Procedural,
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Epistemic => write!(f, "epistemic"),
            Self::Definitional => write!(f, "definitional"),
            Self::Procedural => write!(f, "procedural"),
        }
    }
}

// ---------------------------------------------------------------------------
// Evidence item
// ---------------------------------------------------------------------------

/// A single, immutable piece of evidence about a (target, context) pair.
///
/// `trust` is stored *after* the boundary transform has been applied during
/// ingestion (§4.5); `pre_transform_trust` retains the original value so
/// Recontextualize can re-derive trust under a different context (§4.6,
/// open question on Recontextualize).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: EvidenceID,
    pub kind: EvidenceKind,
    pub claim: String,
    pub valence: f64,
    pub src: AgentID,
    pub time: Timestamp,
    pub trust: f64,
    pub pre_transform_trust: f64,
    pub metadata: BTreeMap<String, String>,
}

impl EvidenceItem {
    /// Construct a new evidence item, deriving its ID from content.
    /// `trust` is the effective (already boundary-transformed) trust;
    /// `pre_transform_trust` is the raw trust before any transform — pass
    /// the same value for both if no boundary transform applies yet.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: EvidenceKind,
        claim: impl Into<String>,
        valence: f64,
        src: AgentID,
        time: Timestamp,
        trust: f64,
        pre_transform_trust: f64,
    ) -> EvidenceResult<Self> {
        if !(-1.0..=1.0).contains(&valence) {
            return Err(EvidenceError::ValenceOutOfRange { valence });
        }
        if !(0.0..=1.0).contains(&trust) {
            return Err(EvidenceError::TrustOutOfRange { trust });
        }
        if !(0.0..=1.0).contains(&pre_transform_trust) {
            return Err(EvidenceError::TrustOutOfRange {
                trust: pre_transform_trust,
            });
        }
        let claim = claim.into();
        let id = derive_evidence_id(kind, &claim, &src, time, DEFAULT_TIME_BUCKET);
        Ok(Self {
            id,
            kind,
            claim,
            valence,
            src,
            time,
            trust,
            pre_transform_trust,
            metadata: BTreeMap::new(),
        })
    }

    /// Attach a metadata key/value, returning the modified item (builder style).
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Re-derive the stored trust from `pre_transform_trust` under a new
    /// boundary-transform factor, returning a fresh item with the same ID
    /// (identity is content-derived from kind/claim/src/time, not trust).
    pub fn with_retransformed_trust(&self, factor: f64) -> Self {
        let mut item = self.clone();
        item.trust = (self.pre_transform_trust * factor).clamp(0.0, 1.0);
        item
    }
}

/// Derive a content-addressed [`EvidenceID`] per §3: `hash(kind, claim, src,
/// time_bucket(time, granularity))`.
pub fn derive_evidence_id(
    kind: EvidenceKind,
    claim: &str,
    src: &AgentID,
    time: Timestamp,
    granularity: TimeDelta,
) -> EvidenceID {
    let bucket = time_bucket(time, granularity);
    let mut hasher = blake3::Hasher::new();
    hasher.update(kind.to_string().as_bytes());
    hasher.update(b"\0");
    hasher.update(claim.as_bytes());
    hasher.update(b"\0");
    hasher.update(src.as_str().as_bytes());
    hasher.update(b"\0");
    hasher.update(&bucket.to_le_bytes());
    EvidenceID::new(hasher.finalize().to_hex().to_string())
}

fn time_bucket(time: Timestamp, granularity: TimeDelta) -> i64 {
    let granularity_ms = granularity.num_milliseconds().max(1);
    time.inner().timestamp_millis().div_euclid(granularity_ms)
}

// ---------------------------------------------------------------------------
// Dedup policy
// ---------------------------------------------------------------------------

/// Evidence-set-level deduplication setting (§3, §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DedupMode {
    /// An item whose derived ID already exists is rejected outright.
    Strict,
    /// Duplicates are retained when the source differs; identical-source
    /// resubmissions are still always rejected.
    Corroboration,
}

impl Default for DedupMode {
    fn default() -> Self {
        Self::Strict
    }
}

// ---------------------------------------------------------------------------
// Evidence set
// ---------------------------------------------------------------------------

/// An ordered, deduplicated collection of evidence items.
///
/// Insertion order is preserved (stored alongside a lookup index) so
/// aggregation is deterministic (§2.2, §5 ordering guarantees).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSet {
    dedup_mode: DedupMode,
    items: Vec<EvidenceItem>,
    /// EvidenceID -> indices into `items` sharing that ID (corroboration mode
    /// may have more than one entry per ID).
    index: HashMap<EvidenceID, Vec<usize>>,
}

impl EvidenceSet {
    pub fn new(dedup_mode: DedupMode) -> Self {
        Self {
            dedup_mode,
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn dedup_mode(&self) -> DedupMode {
        self.dedup_mode
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &EvidenceItem> {
        self.items.iter()
    }

    /// Items of a particular kind, in insertion order.
    pub fn by_kind(&self, kind: EvidenceKind) -> impl Iterator<Item = &EvidenceItem> {
        self.items.iter().filter(move |item| item.kind == kind)
    }

    /// Insert an item, respecting the set's dedup mode. Returns whether it
    /// was accepted.
    pub fn insert(&mut self, item: EvidenceItem) -> bool {
        let existing = self.index.get(&item.id);
        let accepted = match (self.dedup_mode, existing) {
            (_, None) => true,
            (DedupMode::Strict, Some(_)) => false,
            (DedupMode::Corroboration, Some(idx)) => {
                !idx.iter().any(|&i| self.items[i].src == item.src)
            }
        };
        if accepted {
            let idx = self.items.len();
            self.index.entry(item.id.clone()).or_default().push(idx);
            self.items.push(item);
        }
        accepted
    }

    /// Union with another set, preserving `self`'s dedup mode and insertion
    /// order (self's items first, then other's, applying dedup as we go).
    pub fn union(&self, other: &EvidenceSet) -> EvidenceSet {
        let mut out = EvidenceSet::new(self.dedup_mode);
        for item in self.items.iter().chain(other.items.iter()) {
            out.insert(item.clone());
        }
        out
    }

    /// Return a filtered copy containing only items matching `pred`, in the
    /// same relative order and the same dedup mode.
    pub fn filter(&self, pred: impl Fn(&EvidenceItem) -> bool) -> EvidenceSet {
        let mut out = EvidenceSet::new(self.dedup_mode);
        for item in self.items.iter().filter(|i| pred(i)) {
            out.insert(item.clone());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(millis: i64) -> Timestamp {
        Timestamp::new(chrono::DateTime::from_timestamp_millis(millis).unwrap())
    }

    fn item(claim: &str, src: &str, time_millis: i64) -> EvidenceItem {
        EvidenceItem::new(
            EvidenceKind::Epistemic,
            claim,
            0.5,
            AgentID::new(src),
            ts(time_millis),
            0.8,
            0.8,
        )
        .unwrap()
    }

    #[test]
    fn rejects_out_of_range_valence() {
        let err = EvidenceItem::new(
            EvidenceKind::Epistemic,
            "x",
            1.5,
            AgentID::new("a"),
            ts(0),
            0.5,
            0.5,
        );
        assert_eq!(err, Err(EvidenceError::ValenceOutOfRange { valence: 1.5 }));
    }

    #[test]
    fn rejects_out_of_range_trust() {
        let err = EvidenceItem::new(
            EvidenceKind::Epistemic,
            "x",
            0.0,
            AgentID::new("a"),
            ts(0),
            1.5,
            1.5,
        );
        assert_eq!(err, Err(EvidenceError::TrustOutOfRange { trust: 1.5 }));
    }

    #[test]
    fn identical_items_derive_the_same_id() {
        let a = item("claim", "agent-1", 1_000);
        let b = item("claim", "agent-1", 1_000);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn different_claims_derive_different_ids() {
        let a = item("claim-a", "agent-1", 1_000);
        let b = item("claim-b", "agent-1", 1_000);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn strict_dedup_rejects_duplicate_id() {
        let mut set = EvidenceSet::new(DedupMode::Strict);
        assert!(set.insert(item("claim", "agent-1", 1_000)));
        assert!(!set.insert(item("claim", "agent-1", 1_000)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn corroboration_retains_distinct_sources() {
        let mut set = EvidenceSet::new(DedupMode::Corroboration);
        assert!(set.insert(item("claim", "agent-1", 1_000)));
        assert!(set.insert(item("claim", "agent-2", 1_000)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn corroboration_rejects_same_source_resubmission() {
        let mut set = EvidenceSet::new(DedupMode::Corroboration);
        assert!(set.insert(item("claim", "agent-1", 1_000)));
        assert!(!set.insert(item("claim", "agent-1", 1_000)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut set = EvidenceSet::new(DedupMode::Corroboration);
        set.insert(item("first", "agent-1", 1_000));
        set.insert(item("second", "agent-2", 2_000));
        let claims: Vec<_> = set.iter().map(|i| i.claim.as_str()).collect();
        assert_eq!(claims, vec!["first", "second"]);
    }

    #[test]
    fn by_kind_partitions_the_set() {
        let mut set = EvidenceSet::new(DedupMode::Strict);
        set.insert(item("epistemic-claim", "agent-1", 1_000));
        let definitional = EvidenceItem::new(
            EvidenceKind::Definitional,
            "def",
            0.0,
            AgentID::new("sys"),
            ts(1_000),
            1.0,
            1.0,
        )
        .unwrap();
        set.insert(definitional);
        assert_eq!(set.by_kind(EvidenceKind::Epistemic).count(), 1);
        assert_eq!(set.by_kind(EvidenceKind::Definitional).count(), 1);
        assert_eq!(set.by_kind(EvidenceKind::Procedural).count(), 0);
    }

    #[test]
    fn union_preserves_order_and_dedups() {
        let mut a = EvidenceSet::new(DedupMode::Strict);
        a.insert(item("shared", "agent-1", 1_000));
        let mut b = EvidenceSet::new(DedupMode::Strict);
        b.insert(item("shared", "agent-1", 1_000));
        b.insert(item("unique", "agent-2", 2_000));
        let merged = a.union(&b);
        assert_eq!(merged.len(), 2);
    }
}
