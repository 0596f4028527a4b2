//! Benchmarks for proof-of-space operations.
//!
//! Run with: cargo bench -p pospace

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ed25519_dalek::SigningKey;
use pospace::{
    hash::{label_digest, shake256},
    proof_quality, GraphFamily, Prover, Verifier,
};

/// Benchmark label hashing of typical preimage sizes (pk + index + a few
/// parent labels).
fn bench_label_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("label_hash");

    for size in [40, 104, 200, 360].iter() {
        let data = vec![0xabu8; *size];
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| label_digest(black_box(data)));
        });
    }

    group.finish();
}

/// Benchmark SHAKE-256 expansion of a seed into challenge bytes.
fn bench_challenge_expansion(c: &mut Criterion) {
    let seed = [7u8; 64];

    c.bench_function("shake256_expand_16", |b| {
        b.iter(|| {
            let mut out = [0u8; 16 * 8];
            shake256(&mut out, black_box(&seed));
            out
        });
    });
}

/// A committed prover over a small stacked graph, reused across benches.
fn committed_prover(dir: &std::path::Path) -> (Prover, Verifier) {
    let mut prover = Prover::open(SigningKey::from_bytes(&[1u8; 32]), dir.join("db")).unwrap();
    prover.merkle_tree(0).unwrap();
    prover
        .graph(
            0,
            GraphFamily::StackedExpanders {
                n: 64,
                k: 3,
                d: 4,
                localize: false,
            },
        )
        .unwrap();
    prover.make_commit().unwrap();
    let mut verifier = Verifier::with_graph_size(256);
    verifier
        .verify_commitment(&prover.make_commitment().unwrap())
        .unwrap();
    (prover, verifier)
}

/// Benchmark the full commit pipeline (construct, label, build tree).
fn bench_make_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("make_commit");
    group.sample_size(10);

    for n in [16i64, 64].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter(|| {
                let dir = tempfile::tempdir().unwrap();
                let mut prover =
                    Prover::open(SigningKey::from_bytes(&[1u8; 32]), dir.path().join("db"))
                        .unwrap();
                prover.merkle_tree(0).unwrap();
                prover
                    .graph(
                        0,
                        GraphFamily::StackedExpanders {
                            n,
                            k: 3,
                            d: 4,
                            localize: false,
                        },
                    )
                    .unwrap();
                prover.make_commit().unwrap();
                black_box(prover.commit().to_vec())
            });
        });
    }

    group.finish();
}

/// Benchmark space-proof generation and verification.
fn bench_space_proof(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let (prover, mut verifier) = committed_prover(dir.path());
    let seed = [0u8; 64];
    let challenges = verifier.space_challenges(&seed).unwrap();

    c.bench_function("prove_space", |b| {
        b.iter(|| prover.prove_space(black_box(&seed), black_box(&challenges)));
    });

    let proof = prover.prove_space(&seed, &challenges).unwrap();
    c.bench_function("verify_space", |b| {
        b.iter(|| verifier.verify_space(black_box(&proof)));
    });
}

/// Benchmark commit-proof generation and verification.
fn bench_commit_proof(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let (prover, mut verifier) = committed_prover(dir.path());
    let seed = [0u8; 64];
    let challenges = verifier.commit_challenges(&seed).unwrap();

    c.bench_function("prove_commit", |b| {
        b.iter(|| prover.prove_commit(black_box(&seed), black_box(&challenges)));
    });

    let proof = prover.prove_commit(&seed, &challenges).unwrap();
    c.bench_function("verify_commit", |b| {
        b.iter(|| verifier.verify_commit(black_box(&proof)));
    });
}

/// Benchmark the quality function for the agreed graph size.
fn bench_quality(c: &mut Criterion) {
    let values: Vec<Vec<u8>> = (0u8..16).map(|i| vec![i; 32]).collect();

    c.bench_function("proof_quality_65536", |b| {
        b.iter(|| {
            proof_quality(
                black_box(values.iter().map(|v| v.as_slice())),
                black_box(65_536),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_label_hash,
    bench_challenge_expansion,
    bench_make_commit,
    bench_space_proof,
    bench_commit_proof,
    bench_quality,
);

criterion_main!(benches);
