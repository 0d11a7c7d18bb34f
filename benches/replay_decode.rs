//! Benchmarks for replay decoding and full submission validation
//!
//! Uploads are decoded on the request path, so decode cost should stay flat in the
//! size of trailing frame data and linear in the number of splits.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use runcheck::replay;
use runcheck::test_utils::{Submission, ZonesBuilder};
use runcheck::types::TrackType;
use std::hint::black_box;

/// Consistent main-track submission over `stages` stages of four checkpoints.
fn submission_with_stages(stages: usize) -> Submission {
    let mut builder = ZonesBuilder::new();
    for _ in 0..stages {
        builder = builder.segment(4, true, true);
    }
    Submission::traversal(&builder.build(), TrackType::Main, 1, &[1_250, 4_000])
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay_decode");

    for stages in [1usize, 16, 128] {
        let bytes = submission_with_stages(stages).replay_bytes();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("splits", stages), &bytes, |b, bytes| {
            b.iter(|| black_box(replay::decode(black_box(bytes)).expect("replay decodes")))
        });
    }

    // Frame data follows the splits and is never read.
    let mut with_frames = submission_with_stages(16).replay_bytes();
    with_frames.resize(with_frames.len() + 4 * 1024 * 1024, 0x7F);
    group.throughput(Throughput::Bytes(with_frames.len() as u64));
    group.bench_function("trailing_frames_4mib", |b| {
        b.iter(|| black_box(replay::decode(black_box(&with_frames)).expect("replay decodes")))
    });

    group.finish();
}

fn bench_validate_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_all");

    for stages in [1usize, 16, 128] {
        let submission = submission_with_stages(stages);
        let processor = submission.processor().expect("submission parses");
        group.bench_with_input(BenchmarkId::new("stages", stages), &processor, |b, processor| {
            b.iter(|| black_box(processor.validate_all().expect("submission validates")))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_validate_all);
criterion_main!(benches);
