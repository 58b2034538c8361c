//! Placement-strategy benchmarks.
//!
//! The same fragmentation-inducing churn is replayed under each strategy:
//! fill the arena with mixed sizes, punch holes, then allocate into the
//! holes. Selection cost is where the strategies differ (next/first stop at
//! the first candidate, best/worst always scan the whole table).

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use heapfit::{EngineConfig, HeapEngine, Strategy};

const ARENA: usize = 64 * 1024;
const ROUNDS: usize = 64;

fn churn(strategy: Strategy) {
    let mut engine = HeapEngine::new(EngineConfig::production());
    engine.init(ARENA, strategy).unwrap();

    let mut handles = Vec::with_capacity(ROUNDS * 2);

    // Fill with mixed sizes.
    for i in 0..ROUNDS {
        let size = 16 + (i % 7) * 32;
        handles.push(engine.alloc(size).unwrap());
    }

    // Punch holes at every other block.
    let mut kept = Vec::with_capacity(ROUNDS);
    for (i, h) in handles.drain(..).enumerate() {
        if i % 2 == 0 {
            engine.free(h).unwrap();
        } else {
            kept.push(h);
        }
    }

    // Allocate into the fragmented table.
    for i in 0..ROUNDS / 2 {
        let size = 8 + (i % 5) * 16;
        kept.push(engine.alloc(size).unwrap());
    }

    for h in kept {
        engine.free(h).unwrap();
    }

    black_box(engine.block_count().unwrap());
    engine.teardown();
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("fragmentation_churn");
    group.throughput(Throughput::Elements((ROUNDS + ROUNDS / 2) as u64));

    for strategy in [
        Strategy::FirstFit,
        Strategy::NextFit,
        Strategy::BestFit,
        Strategy::WorstFit,
    ] {
        group.bench_function(strategy.to_string(), |b| {
            b.iter(|| churn(black_box(strategy)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);
