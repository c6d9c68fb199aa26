//! Analysis pipeline benchmarks
//!
//! Measures the pure computation path: log aggregation and the pairwise
//! Welch analysis, at event-log sizes a busy experiment actually reaches.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use veredicto::analysis::analyze_experiment;
use veredicto::experiment::{Experiment, ExperimentConfig, InteractionEvent, Variant};
use veredicto::stats::compute_statistics;

fn experiment() -> Experiment {
    let config = ExperimentConfig::builder("bench", "bio_variation", "Bench experiment")
        .variant(Variant::new("control", "Original"))
        .variant(Variant::new("v-1", "Challenger A"))
        .variant(Variant::new("v-2", "Challenger B"))
        .target_metric("click_rate")
        .build();
    Experiment::from_config("exp-bench", config)
}

fn synthetic_log(len: usize) -> Vec<InteractionEvent> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..len)
        .map(|i| {
            let variant = ["control", "v-1", "v-2"][rng.gen_range(0..3)];
            let metric = ["click_rate", "match_rate"][rng.gen_range(0..2)];
            InteractionEvent::builder("exp-bench", variant, format!("user-{i}"), metric)
                .value(rng.gen_range(0.0..1.0))
                .build()
        })
        .collect()
}

fn bench_compute_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_statistics");
    for &size in &[1_000usize, 10_000, 100_000] {
        let events = synthetic_log(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &events, |b, events| {
            b.iter(|| compute_statistics(black_box(events)));
        });
    }
    group.finish();
}

fn bench_full_analysis(c: &mut Criterion) {
    let experiment = experiment();
    let events = synthetic_log(10_000);
    let table = compute_statistics(&events);

    c.bench_function("analyze_experiment_10k", |b| {
        b.iter(|| analyze_experiment(black_box(&experiment), black_box(&table)));
    });
}

criterion_group!(benches, bench_compute_statistics, bench_full_analysis);
criterion_main!(benches);
