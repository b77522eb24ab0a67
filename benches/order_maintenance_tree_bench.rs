//! Benchmark for OrderMaintenanceTree vs standard Vec.
//!
//! Rank insertion in the middle is where the tree should pull ahead; bulk
//! construction and iteration show the constant-factor cost of the nodes.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use omtree::{OrderMaintenanceTree, heaviside};
use std::hint::black_box;

const SIZES: [u64; 3] = [100, 1000, 10000];

// =============================================================================
// from_sorted_vec Benchmark
// =============================================================================

fn benchmark_from_sorted_vec(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("from_sorted_vec");

    for size in SIZES {
        group.bench_with_input(
            BenchmarkId::new("OrderMaintenanceTree", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let values: Vec<u64> = (0..size).collect();
                    black_box(OrderMaintenanceTree::from_sorted_vec(values))
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// insert_at Benchmark (Middle Insertion)
// =============================================================================

fn benchmark_insert_middle(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert_middle");

    for size in SIZES {
        group.bench_with_input(
            BenchmarkId::new("OrderMaintenanceTree", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut tree = OrderMaintenanceTree::new();
                    for value in 0..size {
                        let rank = tree.len() / 2;
                        tree.insert_at(black_box(value), rank).ok();
                    }
                    black_box(tree)
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut vector = Vec::new();
                for value in 0..size {
                    let rank = vector.len() / 2;
                    vector.insert(rank, black_box(value));
                }
                black_box(vector)
            });
        });
    }

    group.finish();
}

// =============================================================================
// fetch Benchmark (Random Access)
// =============================================================================

fn benchmark_fetch(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("fetch");

    for size in SIZES {
        let tree: OrderMaintenanceTree<u64> = (0..size).collect();

        group.bench_with_input(
            BenchmarkId::new("OrderMaintenanceTree", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut sum = 0;
                    for rank in 0..size as usize {
                        if let Ok(&value) = tree.fetch(black_box(rank)) {
                            sum += value;
                        }
                    }
                    black_box(sum)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// Heaviside Search Benchmark
// =============================================================================

fn benchmark_find_zero(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("find_zero");

    for size in SIZES {
        let tree: OrderMaintenanceTree<u64> = (0..size).map(|value| value * 2).collect();

        group.bench_with_input(
            BenchmarkId::new("OrderMaintenanceTree", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut hits = 0;
                    for key in (0..size * 2).step_by(7) {
                        if tree.find_zero(heaviside::equal_to(black_box(key))).is_ok() {
                            hits += 1;
                        }
                    }
                    black_box(hits)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// split_at / merge Benchmark
// =============================================================================

fn benchmark_split_merge(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("split_merge");

    for size in SIZES {
        let tree: OrderMaintenanceTree<u64> = (0..size).collect();

        group.bench_with_input(
            BenchmarkId::new("OrderMaintenanceTree", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut left = tree.clone();
                    let right = left.split_at(black_box(size as usize / 3)).unwrap_or_default();
                    black_box(OrderMaintenanceTree::merge(left, right))
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// Iteration Benchmark
// =============================================================================

fn benchmark_iteration(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("iteration");

    for size in SIZES {
        let tree: OrderMaintenanceTree<u64> = (0..size).collect();
        let vector: Vec<u64> = (0..size).collect();

        group.bench_with_input(
            BenchmarkId::new("OrderMaintenanceTree", size),
            &size,
            |bencher, _| {
                bencher.iter(|| black_box(tree.iter().sum::<u64>()));
            },
        );

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, _| {
            bencher.iter(|| black_box(vector.iter().sum::<u64>()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_from_sorted_vec,
    benchmark_insert_middle,
    benchmark_fetch,
    benchmark_find_zero,
    benchmark_split_merge,
    benchmark_iteration
);

criterion_main!(benches);
