//! Benchmarks for the aggregator and PenaltyDecay's geometric-decay loop.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nu_calculus::aggregator::aggregate;
use nu_calculus::clock::{Clock, MockClock};
use nu_calculus::context::{Context, Role, TimeInterval};
use nu_calculus::evidence::{DedupMode, EvidenceItem, EvidenceKind, EvidenceSet};
use nu_calculus::ids::{AgentID, ContextID, TargetID};
use nu_calculus::operators::penalty_decay;
use nu_calculus::penalty::PenaltySource;
use nu_calculus::policy::Policy;
use nu_calculus::state::State;

/// Install a fmt subscriber so operator spans show up under
/// `RUST_LOG=debug cargo bench`. Only the first call wins.
fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init()
            .ok();
    });
}

fn evidence_set(n: usize) -> EvidenceSet {
    let clock = MockClock::new();
    let mut set = EvidenceSet::new(DedupMode::Corroboration);
    for i in 0..n {
        let valence = if i % 2 == 0 { 0.6 } else { -0.4 };
        set.insert(
            EvidenceItem::new(
                EvidenceKind::Epistemic,
                format!("claim-{i}"),
                valence,
                AgentID::new(format!("agent-{i}")),
                clock.now(),
                0.8,
                0.8,
            )
            .unwrap(),
        );
    }
    set
}

fn bench_aggregate_100(c: &mut Criterion) {
    init_tracing();
    let set = evidence_set(100);
    let clock = MockClock::new();
    let mut ctx = Context::new(ContextID::new("k"), TimeInterval::from(clock.now()), "p");
    for i in 0..100 {
        ctx.set_role(AgentID::new(format!("agent-{i}")), Role::I);
    }
    let policy = Policy::default();

    c.bench_function("aggregate_100_items", |bench| {
        bench.iter(|| black_box(aggregate(&set, &TargetID::new("t"), &ctx, &policy, clock.now())))
    });
}

fn bench_penalty_decay(c: &mut Criterion) {
    init_tracing();
    let policy = Policy::default();
    let clock = MockClock::new();

    c.bench_function("penalty_decay_one_step", |bench| {
        bench.iter_batched(
            || {
                let mut state = State::initial(TargetID::new("t"), ContextID::new("k"), clock.now(), DedupMode::Strict);
                state.nu_penalties.insert(PenaltySource::ScopeExpansion, 0.2);
                state
            },
            |state| black_box(penalty_decay(state, &policy, &clock).unwrap()),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_aggregate_100, bench_penalty_decay);
criterion_main!(benches);
