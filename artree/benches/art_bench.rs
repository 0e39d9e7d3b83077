/// Point operations and scans over a few fixed tree sizes. Here to catch regressions quickly.
use std::hint::black_box;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::SliceRandom;
use rand::{thread_rng, Rng};

use artree::AdaptiveRadixTree;

const TREE_SIZES: [u64; 3] = [1 << 12, 1 << 16, 1 << 20];

pub fn rand_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("rand_insert");
    group.throughput(Throughput::Elements(1));

    let keys = gen_keys(3, 2, 3);
    group.bench_function("str_keys", |b| {
        let mut tree = AdaptiveRadixTree::new();
        let mut rng = thread_rng();
        b.iter(|| {
            let key = &keys[rng.gen_range(0..keys.len())];
            tree.insert(key, key.len());
        })
    });

    group.bench_function("u64_keys", |b| {
        let mut tree = AdaptiveRadixTree::new();
        let mut rng = thread_rng();
        b.iter(|| {
            let key: u64 = rng.gen();
            tree.insert(key.to_be_bytes(), key);
        })
    });

    group.finish();
}

pub fn rand_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("rand_remove");
    group.throughput(Throughput::Elements(1));

    let keys = gen_keys(3, 2, 3);
    group.bench_function("str_keys", |b| {
        let mut tree = AdaptiveRadixTree::new();
        for key in &keys {
            tree.insert(key, key.len());
        }
        let mut rng = thread_rng();
        b.iter(|| {
            let key = &keys[rng.gen_range(0..keys.len())];
            black_box(tree.remove(key));
        })
    });

    group.finish();
}

pub fn rand_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("rand_get");
    group.throughput(Throughput::Elements(1));
    for size in TREE_SIZES {
        group.bench_with_input(BenchmarkId::new("u64_keys", size), &size, |b, size| {
            let mut tree = AdaptiveRadixTree::new();
            for i in 0..*size {
                tree.insert(i.to_be_bytes(), i);
            }
            let mut rng = thread_rng();
            b.iter(|| {
                let key = rng.gen_range(0..*size);
                black_box(tree.get(key.to_be_bytes()));
            })
        });
    }

    let keys = gen_keys(3, 2, 3);
    group.bench_function("str_keys", |b| {
        let mut tree = AdaptiveRadixTree::new();
        for (i, key) in keys.iter().enumerate() {
            tree.insert(key, i);
        }
        let mut rng = thread_rng();
        b.iter(|| {
            let key = &keys[rng.gen_range(0..keys.len())];
            black_box(tree.get(key));
        })
    });

    group.finish();
}

pub fn seq_get(c: &mut Criterion) {
    for size in TREE_SIZES {
        c.bench_with_input(BenchmarkId::new("seq_get", size), &size, |b, size| {
            let mut tree = AdaptiveRadixTree::new();
            for i in 0..*size {
                tree.insert(i.to_be_bytes(), i);
            }
            b.iter_custom(|iters| {
                let mut c = 0u64;
                let start = Instant::now();
                for _ in 0..iters {
                    if c == *size {
                        c = 0;
                    }
                    black_box(tree.get(c.to_be_bytes()));
                    c += 1;
                }
                start.elapsed()
            })
        });
    }
}

pub fn seq_insert(c: &mut Criterion) {
    c.bench_function("seq_insert", |b| {
        let mut tree = AdaptiveRadixTree::new();
        let mut key = 0u64;
        b.iter(|| {
            tree.insert(key.to_be_bytes(), key);
            key += 1;
        })
    });
}

pub fn seq_remove(c: &mut Criterion) {
    for size in TREE_SIZES {
        c.bench_with_input(BenchmarkId::new("seq_remove", size), &size, |b, size| {
            let mut tree = AdaptiveRadixTree::new();
            b.iter_custom(|iters| {
                for i in 0..*size {
                    tree.insert(i.to_be_bytes(), i);
                }
                let mut start = Instant::now();
                let mut cumulative_time = Duration::new(0, 0);
                let mut c = 0u64;
                for _ in 0..iters {
                    if c == *size {
                        cumulative_time += start.elapsed();
                        c = 0;
                        for i in 0..*size {
                            tree.insert(i.to_be_bytes(), i);
                        }
                        start = Instant::now();
                    }
                    black_box(tree.remove(c.to_be_bytes()));
                    c += 1;
                }
                cumulative_time += start.elapsed();
                cumulative_time
            })
        });
    }
}

pub fn scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    for size in TREE_SIZES {
        let mut tree = AdaptiveRadixTree::new();
        for i in 0..size {
            tree.insert(i.to_be_bytes(), i);
        }
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("iter", size), &tree, |b, tree| {
            b.iter(|| black_box(tree.iter().map(|(_, v)| *v).sum::<u64>()))
        });
        group.bench_with_input(BenchmarkId::new("walk", size), &tree, |b, tree| {
            b.iter(|| {
                let mut sum = 0u64;
                let _ = tree.walk(|_, v| {
                    sum += *v;
                    ControlFlow::<()>::Continue(())
                });
                black_box(sum)
            })
        });
    }

    let keys = gen_keys(3, 2, 3);
    let mut tree = AdaptiveRadixTree::new();
    for (i, key) in keys.iter().enumerate() {
        tree.insert(key, i);
    }
    group.bench_function("prefix_iter", |b| {
        let mut rng = thread_rng();
        b.iter(|| {
            let key = &keys[rng.gen_range(0..keys.len())];
            black_box(tree.prefix_iter(&key[..5]).count())
        })
    });

    group.finish();
}

pub fn copy(c: &mut Criterion) {
    let mut tree = AdaptiveRadixTree::new();
    for i in 0..(1u64 << 16) {
        tree.insert(i.to_be_bytes(), i);
    }
    c.bench_function("copy", |b| b.iter(|| black_box(tree.copy())));
}

fn gen_keys(l1_prefix: usize, l2_prefix: usize, suffix: usize) -> Vec<String> {
    let mut keys = Vec::new();
    let chars: Vec<char> = ('a'..='z').collect();
    let mut rng = thread_rng();
    for c1 in &chars {
        let level1_prefix = c1.to_string().repeat(l1_prefix);
        for c2 in &chars {
            let key_prefix = level1_prefix.clone() + &c2.to_string().repeat(l2_prefix);
            for _ in 0..=u8::MAX {
                let suffix: String = (0..suffix)
                    .map(|_| chars[rng.gen_range(0..chars.len())])
                    .collect();
                keys.push(key_prefix.clone() + &suffix);
            }
        }
    }

    keys.shuffle(&mut rng);
    keys
}

criterion_group!(rand_benches, rand_get, rand_insert, rand_remove);
criterion_group!(seq_benches, seq_get, seq_insert, seq_remove);
criterion_group!(scan_benches, scan, copy);
criterion_main!(seq_benches, rand_benches, scan_benches);
