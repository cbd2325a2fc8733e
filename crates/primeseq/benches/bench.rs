use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use num_bigint::BigUint;
use primeseq::{BasePrimes, PrimeSequenceGenerator, ProbabilisticGenerator, SieveGenerator};
use std::sync::Arc;

// Width of every benchmarked range.
const SPAN: u64 = 1_000_000;

fn bench_sieve(c: &mut Criterion) {
    let mut group = c.benchmark_group("sieve");
    group.throughput(Throughput::Elements(SPAN));

    let generator = SieveGenerator::<u64>::new();
    group.bench_function(format!("from_2/span_{SPAN}"), |b| {
        b.iter(|| black_box(generator.generate(2, SPAN, true).unwrap().count()));
    });

    let from = 1_000_000_000_000;
    group.bench_function(format!("from_1e12/span_{SPAN}"), |b| {
        b.iter(|| {
            black_box(
                generator
                    .generate(from, from + SPAN, true)
                    .unwrap()
                    .count(),
            )
        });
    });

    let shared = SieveGenerator::<u64>::with_base_primes(Arc::new(
        BasePrimes::for_ceiling(from + SPAN).unwrap(),
    ));
    group.bench_function(format!("from_1e12/span_{SPAN}/shared_base"), |b| {
        b.iter(|| black_box(shared.generate(from, from + SPAN, true).unwrap().count()));
    });

    group.finish();
}

fn bench_probabilistic(c: &mut Criterion) {
    let mut group = c.benchmark_group("probabilistic");
    // Probing is far slower per element; keep the window small.
    let span = SPAN / 100;
    group.throughput(Throughput::Elements(span));
    group.sample_size(10);

    let generator = ProbabilisticGenerator::new();
    for from in [2_u64, 1_000_000_000_000] {
        group.bench_function(format!("from_{from}/span_{span}"), |b| {
            b.iter(|| {
                black_box(
                    generator
                        .generate(BigUint::from(from), BigUint::from(from + span), true)
                        .unwrap()
                        .count(),
                )
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sieve, bench_probabilistic);
criterion_main!(benches);
