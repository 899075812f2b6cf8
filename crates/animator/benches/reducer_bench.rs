//! Reducer benchmarks: incremental append vs. undo replay

use animator::{
    apply_actions_to_state, initial_state, ActionJournal, AnchorPolicy, ContentAction,
    ReducerConfig,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const CONFIG: ReducerConfig = ReducerConfig {
    drawing_size: [1920.0, 1080.0],
};

fn strokes(count: usize) -> Vec<ContentAction> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            let x = rng.gen_range(0.0..1800.0);
            let y = rng.gen_range(0.0..1000.0);
            let r = rng.gen_range(5.0..60.0);
            ContentAction::AddPolygon {
                polygon: vec![[x, y], [x + r, y], [x + r, y + r], [x, y + r]],
                frame: rng.gen_range(0..8),
            }
        })
        .collect()
}

fn bench_full_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_replay");
    for count in [50, 200] {
        let actions = strokes(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &actions, |b, actions| {
            b.iter(|| apply_actions_to_state(black_box(actions), &initial_state(), &CONFIG));
        });
    }
    group.finish();
}

fn bench_append(c: &mut Criterion) {
    let journal = ActionJournal::from_actions(strokes(200), CONFIG, AnchorPolicy::default());
    let next = strokes(201).pop();

    c.bench_function("append_one", |b| {
        b.iter_batched(
            || (journal.clone(), next.clone()),
            |(mut journal, next)| {
                if let Some(action) = next {
                    journal.append(action);
                }
                journal
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_undo(c: &mut Criterion) {
    let mut group = c.benchmark_group("undo");
    for (name, policy) in [
        ("anchored", AnchorPolicy::default()),
        (
            "unanchored",
            AnchorPolicy {
                anchor_interval: 0,
                max_anchors: 0,
            },
        ),
    ] {
        let journal = ActionJournal::from_actions(strokes(200), CONFIG, policy);
        group.bench_function(name, |b| {
            b.iter_batched(
                || journal.clone(),
                |mut journal| {
                    let _ = journal.pop();
                    journal
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_full_replay, bench_append, bench_undo);
criterion_main!(benches);
