use crate::{ledger_with, now, SCENARIOS};
use criterion::{black_box, criterion_group, BenchmarkId, Criterion};
use personal_ledger::snapshot;

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot::serialize_at");
    for size in SCENARIOS {
        let ledger = ledger_with(size);
        group.throughput(criterion::Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &ledger, |b, ledger| {
            b.iter(|| snapshot::serialize_at(black_box(ledger), &now()))
        });
    }
    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot::load_at");
    for size in SCENARIOS {
        let raw = snapshot::serialize_at(&ledger_with(size), &now())
            .expect("Benchmark setup: unable to serialize ledger");
        group.throughput(criterion::Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &raw, |b, raw| {
            b.iter(|| snapshot::load_at(black_box(Some(raw.as_str())), now()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_serialize, bench_load);
