//! # nu-calculus
//!
//! A definedness calculus engine: for each `(target, context)` pair it tracks
//! ν ∈ [0,1], a score derived from semantic, epistemic, and procedural
//! sub-scores plus situational penalties, answering whether downstream truth
//! evaluation may proceed against that target and how its definedness has
//! evolved under a sequence of refinement operators.
//!
//! ## Architecture
//!
//! - **Data model** (`ids`, `evidence`, `context`, `penalty`, `state`):
//!   identifiers, evidence items and sets, contexts, the closed penalty-source
//!   set, and the per-`(target, context)` `State`.
//! - **Aggregation** (`aggregator`, `definedness`, `boundary`): folding a
//!   decayed, relevance-weighted evidence set into `Def_ep`/`Def_proc`, the
//!   pluggable `Def_sem` provider, and the boundary trust transform.
//! - **Operators** (`operators`): the eight pure refinement operators —
//!   `Incorporate`, `NegDefine`, `Merge`, `Recontextualize`, `Conflict`,
//!   `QueryNext`, `Split`, `Decay`/`PenaltyDecay` — each
//!   `(State, args, Policy, Clock) -> (State, RefinementRecord)`.
//! - **Query** (`query`): the licensing gate distinct from `QueryNext`.
//! - **Trace** (`trace`, `record`): the append-only provenance log.
//!
//! ## Library usage
//!
//! ```
//! use nu_calculus::clock::{MockClock, Clock};
//! use nu_calculus::context::{Context, Role, TimeInterval};
//! use nu_calculus::definedness::DefaultSemanticProvider;
//! use nu_calculus::evidence::{EvidenceItem, EvidenceKind};
//! use nu_calculus::ids::{AgentID, ContextID, TargetID};
//! use nu_calculus::operators::incorporate;
//! use nu_calculus::policy::Policy;
//! use nu_calculus::state::State;
//!
//! let policy = Policy::default();
//! let clock = MockClock::new();
//! let mut ctx = Context::new(ContextID::new("default"), TimeInterval::from(clock.now()), "default");
//! ctx.set_role(AgentID::new("alice"), Role::I);
//!
//! let state = State::initial(TargetID::new("mars-has-life"), ContextID::new("default"), clock.now(), Default::default());
//! let provider = DefaultSemanticProvider;
//! let evidence = EvidenceItem::new(
//!     EvidenceKind::Epistemic, "rover soil sample", 0.6, AgentID::new("alice"), clock.now(), 0.8, 0.8,
//! ).unwrap();
//! let (state, record) = incorporate(state, &ctx, vec![evidence], &provider, &policy, &clock).unwrap();
//! assert!(record.after_nu_raw < record.before_nu_raw);
//! ```

pub mod aggregator;
pub mod boundary;
pub mod clock;
pub mod context;
pub mod definedness;
pub mod error;
pub mod evidence;
pub mod ids;
pub mod operators;
pub mod penalty;
pub mod policy;
pub mod query;
pub mod record;
pub mod relevance;
pub mod state;
pub mod trace;
