//! Benchmarks for the comparison engine.
//!
//! Run with: `cargo bench --package jsondiff-core`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jsondiff_core::JsonComparator;
use jsondiff_types::{CompareMode, Object, Value};

/// An array of `n` records keyed by `id`, in reverse order when `reversed`.
fn records(n: usize, reversed: bool) -> Value {
    let mut items: Vec<Value> = (0..n)
        .map(|i| {
            let object: Object = [
                ("id", Value::from(i)),
                ("name", Value::from(format!("item-{i}"))),
                ("price", Value::from(i as f64 * 1.5)),
            ]
            .into_iter()
            .collect();
            Value::Object(object)
        })
        .collect();
    if reversed {
        items.reverse();
    }
    Value::Array(items)
}

fn scalars(n: usize, reversed: bool) -> Value {
    let mut items: Vec<Value> = (0..n).map(|i| Value::from(i % 97)).collect();
    if reversed {
        items.reverse();
    }
    Value::Array(items)
}

fn bench_unordered_arrays(c: &mut Criterion) {
    let mut group = c.benchmark_group("unordered_arrays");
    let comparator = JsonComparator::new(CompareMode::Lenient.into());

    for &n in &[100usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(n as u64));

        let (expected, actual) = (records(n, false), records(n, true));
        group.bench_with_input(BenchmarkId::new("unique_key", n), &n, |b, _| {
            b.iter(|| comparator.compare(black_box(&expected), black_box(&actual)));
        });

        let (expected, actual) = (scalars(n, false), scalars(n, true));
        group.bench_with_input(BenchmarkId::new("multiset", n), &n, |b, _| {
            b.iter(|| comparator.compare(black_box(&expected), black_box(&actual)));
        });
    }

    group.finish();
}

fn bench_strict_order(c: &mut Criterion) {
    let comparator = JsonComparator::new(CompareMode::Strict.into());
    let expected = records(1_000, false);
    let actual = records(1_000, false);

    c.bench_function("strict_order_1000", |b| {
        b.iter(|| comparator.compare(black_box(&expected), black_box(&actual)));
    });
}

criterion_group!(benches, bench_unordered_arrays, bench_strict_order);
criterion_main!(benches);
