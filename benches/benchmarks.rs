use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use json_dict::{Dictionary, Policy};
use std::hint::black_box;
use std::path::PathBuf;

fn bench_path(name: &str, size: usize) -> PathBuf {
    std::env::temp_dir().join(format!("json_dict_bench_{}_{}.json", name, size))
}

/// Fresh lenient dictionary pre-filled with `size` words.
fn seeded(name: &str, size: usize) -> (Dictionary, PathBuf) {
    let path = bench_path(name, size);
    let _ = std::fs::remove_file(&path);
    let dict = Dictionary::builder(&path)
        .policy(Policy::Lenient)
        .build()
        .unwrap();
    for i in 0..size {
        dict.add(&format!("k{i}"), "some definition").unwrap();
    }
    (dict, path)
}

// Each mutation rewrites the whole document, so cost grows with its size.
fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");
    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("upsert", size), &size, |b, &size| {
            let (dict, path) = seeded("add", size);
            b.iter(|| dict.add(black_box("hot"), black_box("definition")).unwrap());
            drop(dict);
            let _ = std::fs::remove_file(&path);
        });
    }
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("fresh_read", size), &size, |b, &size| {
            let (dict, path) = seeded("get", size);
            b.iter(|| black_box(dict.get("k0").unwrap()));
            drop(dict);
            let _ = std::fs::remove_file(&path);
        });
    }
}

fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("list");
    for size in [100, 1000] {
        group.bench_with_input(BenchmarkId::new("sorted", size), &size, |b, &size| {
            let (dict, path) = seeded("list", size);
            b.iter(|| black_box(dict.list().unwrap()));
            drop(dict);
            let _ = std::fs::remove_file(&path);
        });
    }
}

criterion_group!(benches, bench_add, bench_get, bench_list);
criterion_main!(benches);
