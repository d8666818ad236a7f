//! Performance benchmarks for crossfs
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use crossfs::core::TreeCopyEngine;
use crossfs::fs::{DirFs, FileSystem, FsHandle, FsPath, MemoryFs};
use std::fs::File;
use std::io::Write;
use tempfile::TempDir;

/// Create a test file of the specified size
fn create_test_file(dir: &std::path::Path, name: &str, size: usize) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();

    let chunk_size = 64 * 1024;
    let chunk: Vec<u8> = (0..chunk_size).map(|i| (i % 256) as u8).collect();
    let mut remaining = size;

    while remaining > 0 {
        let to_write = remaining.min(chunk_size);
        file.write_all(&chunk[..to_write]).unwrap();
        remaining -= to_write;
    }

    path
}

/// Fresh destination directory on a new in-memory instance
fn memory_destination() -> FsPath {
    let fs = MemoryFs::windows();
    FsPath::new(&fs, "C:\\work")
}

fn bench_memory_to_memory(c: &mut Criterion) {
    let fs = MemoryFs::unix();
    let source = FsPath::new(&fs, "/work/tree");
    for i in 0..10 {
        for j in 0..100 {
            source
                .resolve(&format!("subdir_{}/file_{}.txt", i, j))
                .write_new(&[b'x'; 1024])
                .unwrap();
        }
    }

    c.bench_function("memory_to_memory_1000_small_files", |b| {
        b.iter(|| {
            let dest = memory_destination();
            black_box(
                TreeCopyEngine::new()
                    .copy_dir_recursively(Some(&source), Some(&dest))
                    .unwrap(),
            )
        });
    });
}

fn bench_host_to_memory(c: &mut Criterion) {
    let mut group = c.benchmark_group("host_to_memory");

    for size in [1024 * 1024, 10 * 1024 * 1024].iter() {
        let src_dir = TempDir::new().unwrap();
        create_test_file(src_dir.path(), "large.bin", *size);
        let host: FsHandle = DirFs::new(src_dir.path()).unwrap();
        let source = FsPath::from_location(&host, host.working_dir());

        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(
            BenchmarkId::new("contents", humansize::format_size(*size as u64, humansize::BINARY)),
            size,
            |b, _| {
                b.iter(|| {
                    let dest = memory_destination();
                    black_box(
                        TreeCopyEngine::new()
                            .copy_dir_contents_recursively(Some(&source), Some(&dest))
                            .unwrap(),
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_memory_to_memory, bench_host_to_memory);

criterion_main!(benches);
