//! End-to-end proof-of-space exchange over the default stacked-expander
//! graph: commit, challenge, prove, verify, score.

use ed25519_dalek::SigningKey;
use pospace::{
    commit_quality, space_quality, CommitProof, GraphFamily, Prover, SpaceProof, Verifier,
    VerifyFailure, SEED_SIZE,
};

#[test]
fn full_exchange_over_default_stacked_graph() {
    let dir = tempfile::tempdir().unwrap();
    let signing_key = SigningKey::from_bytes(&[1u8; 32]);
    let mut prover = Prover::open(signing_key, dir.path().join("db")).unwrap();
    prover.merkle_tree(0).unwrap();
    prover.graph(0, GraphFamily::stacked_expanders()).unwrap();
    prover.make_commit().unwrap();
    assert_eq!(prover.graph_size(), Some(65_536));

    let mut verifier = Verifier::new();
    verifier
        .verify_commitment(&prover.make_commitment().unwrap())
        .unwrap();

    let seed = [0u8; SEED_SIZE];

    // commit phase
    let commit_challenges = verifier.commit_challenges(&seed).unwrap();
    assert_eq!(commit_challenges.len(), 16);
    let commit_proof = prover.prove_commit(&seed, &commit_challenges).unwrap();
    assert_eq!(verifier.verify_commit(&commit_proof), Ok(()));
    let cq = commit_quality(&verifier, &commit_proof);
    assert!(cq > 0.0 && cq <= 1.0, "commit quality {cq} out of range");

    // a single flipped branch byte must surface as a path mismatch
    let mut tampered = commit_proof.clone();
    tampered.proofs[0].branch[0][0] ^= 1;
    assert!(matches!(
        verifier.verify_commit(&tampered),
        Err(VerifyFailure::PathMismatch { .. })
    ));

    // commit proofs survive the JSON wire format
    let json = serde_json::to_string(&commit_proof).unwrap();
    let recovered: CommitProof = serde_json::from_str(&json).unwrap();
    assert_eq!(verifier.verify_commit(&recovered), Ok(()));

    // space phase
    let space_challenges = verifier.space_challenges(&seed).unwrap();
    assert_eq!(space_challenges.len(), 16);
    let space_proof = prover.prove_space(&seed, &space_challenges).unwrap();
    assert_eq!(verifier.verify_space(&space_proof), Ok(()));
    let sq = space_quality(&verifier, &space_proof);
    assert!(sq > 0.0 && sq <= 1.0, "space quality {sq} out of range");

    let json = serde_json::to_string(&space_proof).unwrap();
    let recovered: SpaceProof = serde_json::from_str(&json).unwrap();
    assert_eq!(verifier.verify_space(&recovered), Ok(()));
}

#[test]
fn exchange_rejects_foreign_commit() {
    // proofs generated against one keypair's labelling must not verify
    // against another prover's commitment
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let family = GraphFamily::StackedExpanders {
        n: 32,
        k: 3,
        d: 4,
        localize: false,
    };

    let mut build = |key: u8, path: &std::path::Path| {
        let mut prover = Prover::open(SigningKey::from_bytes(&[key; 32]), path).unwrap();
        prover.merkle_tree(0).unwrap();
        prover.graph(0, family).unwrap();
        prover.make_commit().unwrap();
        prover
    };
    let prover_a = build(1, &dir_a.path().join("db"));
    let prover_b = build(2, &dir_b.path().join("db"));
    assert_ne!(prover_a.commit(), prover_b.commit());

    let mut verifier = Verifier::with_graph_size(128);
    verifier
        .verify_commitment(&prover_a.make_commitment().unwrap())
        .unwrap();
    let seed = [9u8; SEED_SIZE];
    let challenges = verifier.space_challenges(&seed).unwrap();
    let foreign = prover_b.prove_space(&seed, &challenges).unwrap();
    assert!(matches!(
        verifier.verify_space(&foreign),
        Err(VerifyFailure::PathMismatch { .. })
    ));
}
