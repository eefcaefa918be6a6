use crate::{ledger_with, now, SCENARIOS};
use criterion::{black_box, criterion_group, BatchSize, BenchmarkId, Criterion};

fn bench_deposit(c: &mut Criterion) {
    let mut group = c.benchmark_group("Ledger::deposit_at");
    for size in SCENARIOS {
        let ledger = ledger_with(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &ledger, |b, ledger| {
            b.iter_batched(
                || ledger.clone(),
                |mut ledger| {
                    let _ = ledger.deposit_at(black_box(12.34), None, now());
                    ledger
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_monthly_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("Ledger::monthly_stats_at");
    for size in SCENARIOS {
        let ledger = ledger_with(size);
        group.throughput(criterion::Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &ledger, |b, ledger| {
            b.iter(|| ledger.monthly_stats_at(black_box(&now())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_deposit, bench_monthly_stats);
