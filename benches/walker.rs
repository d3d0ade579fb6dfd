//! Benchmarks for the reference walk and a full validation pass.
//!
//! Trees are built in a `MemoryFS` so the numbers measure traversal and
//! parsing rather than disk access.

use std::path::{Path, PathBuf};

use avocado::config::ValidationConfig;
use avocado::filesystem::MemoryFS;
use avocado::pipeline::validate_specification_folder;
use avocado::walker::ReferenceWalker;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const README: &str = "/repo/specification/rp/readme.md";

/// A chain `0.json -> 1.json -> ... -> n-1.json`.
fn chain_fs(length: usize) -> MemoryFS {
    let mut fs = MemoryFS::new();
    for i in 0..length {
        let content = if i + 1 < length {
            format!(r#"{{"definitions": {{"X": {{"$ref": "{}.json#/definitions/X"}}}}}}"#, i + 1)
        } else {
            r#"{"definitions": {"X": {"type": "string"}}}"#.to_string()
        };
        fs.add_file_string(format!("/repo/specification/rp/{i}.json"), &content);
    }
    fs
}

/// `width` roots that all reference every one of `width` shared documents.
fn dense_fs(width: usize) -> MemoryFS {
    let mut fs = MemoryFS::new();
    let refs: Vec<String> = (0..width)
        .map(|i| format!(r#""s{i}": {{"$ref": "shared/{i}.json"}}"#))
        .collect();
    let root = format!("{{{}}}", refs.join(", "));
    for i in 0..width {
        fs.add_file_string(format!("/repo/specification/rp/root{i}.json"), &root);
        fs.add_file_string(
            format!("/repo/specification/rp/shared/{i}.json"),
            r#"{"type": "object"}"#,
        );
    }
    fs
}

/// `readmes` services, each with a readme and `files` chained documents.
fn repository_fs(readmes: usize, files: usize) -> MemoryFS {
    let mut fs = MemoryFS::new();
    for r in 0..readmes {
        let dir = format!("/repo/specification/service{r}/stable/2022-01-01");
        fs.add_file_string(
            format!("/repo/specification/service{r}/readme.md"),
            "> see https://aka.ms/autorest\n\n```yaml\ninput-file: stable/2022-01-01/0.json\n```\n",
        );
        for i in 0..files {
            let content = if i + 1 < files {
                format!(r#"{{"$ref": "{}.json"}}"#, i + 1)
            } else {
                "{}".to_string()
            };
            fs.add_file_string(format!("{dir}/{i}.json"), &content);
        }
    }
    fs
}

fn walk(fs: &MemoryFS, roots: Vec<PathBuf>) -> usize {
    let mut walker = ReferenceWalker::new(fs, Path::new(README), roots);
    let findings = walker.by_ref().count();
    findings + walker.into_outcome().reachable.len()
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("walker_chain");
    for length in [100, 1_000, 5_000] {
        let fs = chain_fs(length);
        group.bench_with_input(BenchmarkId::from_parameter(length), &fs, |b, fs| {
            b.iter(|| walk(fs, vec![PathBuf::from("/repo/specification/rp/0.json")]))
        });
    }
    group.finish();
}

fn bench_dense(c: &mut Criterion) {
    let mut group = c.benchmark_group("walker_dense");
    for width in [10, 50] {
        let fs = dense_fs(width);
        let roots: Vec<PathBuf> = (0..width)
            .map(|i| PathBuf::from(format!("/repo/specification/rp/root{i}.json")))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(width), &fs, |b, fs| {
            b.iter(|| walk(fs, black_box(roots.clone())))
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let fs = repository_fs(40, 25);
    let mut config = ValidationConfig::new("/repo");
    c.bench_function("pipeline_40_readmes", |b| {
        b.iter(|| validate_specification_folder(black_box(&fs), &config).map(|e| e.len()))
    });
    config.concurrency = 1;
    c.bench_function("pipeline_40_readmes_sequential", |b| {
        b.iter(|| validate_specification_folder(black_box(&fs), &config).map(|e| e.len()))
    });
}

criterion_group!(benches, bench_chain, bench_dense, bench_pipeline);
criterion_main!(benches);
