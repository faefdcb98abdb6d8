use balance_engine::optimization::settlement::SettlementEngine;
use balance_engine::simulation::stress_test::{generate_random_group, GroupConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_group(c: &mut Criterion, name: &str, member_count: usize, expense_count: usize) {
    let config = GroupConfig {
        member_count,
        expense_count,
        settlement_count: expense_count / 10,
        ..Default::default()
    };
    let snapshot = generate_random_group(&config).expect("generated group is valid");
    let splits = snapshot.splits();

    c.bench_function(name, |b| {
        b.iter(|| {
            SettlementEngine::suggest_settlements(
                black_box(&snapshot.members),
                black_box(&splits),
                black_box(&snapshot.settlements),
            )
        })
    });
}

fn bench_settlement_small(c: &mut Criterion) {
    bench_group(c, "settlement_5_members", 5, 50);
}

fn bench_settlement_medium(c: &mut Criterion) {
    bench_group(c, "settlement_50_members", 50, 1_000);
}

fn bench_settlement_large(c: &mut Criterion) {
    bench_group(c, "settlement_500_members", 500, 10_000);
}

criterion_group!(
    benches,
    bench_settlement_small,
    bench_settlement_medium,
    bench_settlement_large
);
criterion_main!(benches);
