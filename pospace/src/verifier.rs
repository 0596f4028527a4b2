//! The verifier: derives challenge indices from a public seed and checks
//! the structural and cryptographic validity of commit and space proofs
//! against a remembered commitment.

use ed25519_dalek::{Verifier as _, VerifyingKey};

use crate::error::VerifyFailure;
use crate::hash::{label_digest, shake256, HASH_SIZE};
use crate::math::log2;
use crate::merkle::verify_proof;
use crate::prover::{CommitProof, Commitment, SpaceProof};
use crate::varint::{decode_i64, encode_i64, WINDOW};

/// Multiplier on `⌈log2 N⌉` for the commit-proof challenge count.
pub const ALPHA_MULT: usize = 1;
/// Multiplier on `⌈log2 N⌉` for the space-proof challenge count.
pub const BETA_MULT: usize = 1;
/// The agreed DAG size.
pub const GRAPH_SIZE: i64 = 65_536;
/// Required challenge-seed length in bytes.
pub const SEED_SIZE: usize = 64;

/// Challenge derivation and proof checking for one prover's commitment.
///
/// State spans a single challenge exchange: a commitment is adopted via
/// [`Verifier::verify_commitment`] (or [`Verifier::receive_commit`]), a
/// challenge set is sampled from a seed, and proofs are checked against
/// both. Rejections carry their concrete [`VerifyFailure`] reason and
/// leave the verifier unchanged.
pub struct Verifier {
    alpha: usize,
    beta: usize,
    challenges: Vec<i64>,
    commit: Vec<u8>,
    public_key: Option<VerifyingKey>,
    graph_size: i64,
}

impl Verifier {
    /// A verifier for the agreed [`GRAPH_SIZE`].
    pub fn new() -> Self {
        Self::with_graph_size(GRAPH_SIZE)
    }

    /// A verifier for a non-standard graph size.
    pub fn with_graph_size(graph_size: i64) -> Self {
        let alpha = log2(graph_size) as usize * ALPHA_MULT;
        let beta = log2(graph_size) as usize * BETA_MULT;
        Self {
            alpha,
            beta,
            challenges: Vec::new(),
            commit: Vec::new(),
            public_key: None,
            graph_size,
        }
    }

    pub fn graph_size(&self) -> i64 {
        self.graph_size
    }

    /// The challenge set sampled most recently.
    pub fn challenges(&self) -> &[i64] {
        &self.challenges
    }

    /// Adopt a bare commit and public key.
    pub fn receive_commit(
        &mut self,
        commit: &[u8],
        public_key: VerifyingKey,
    ) -> Result<(), VerifyFailure> {
        if commit.len() != HASH_SIZE {
            return Err(VerifyFailure::CommitLength {
                expected: HASH_SIZE,
                got: commit.len(),
            });
        }
        self.commit = commit.to_vec();
        self.public_key = Some(public_key);
        Ok(())
    }

    /// Check a signed commitment and adopt it.
    pub fn verify_commitment(&mut self, commitment: &Commitment) -> Result<(), VerifyFailure> {
        if commitment.commit.len() != HASH_SIZE {
            return Err(VerifyFailure::CommitLength {
                expected: HASH_SIZE,
                got: commitment.commit.len(),
            });
        }
        if commitment
            .public_key
            .verify(&commitment.commit, &commitment.signature)
            .is_err()
        {
            return Err(VerifyFailure::Signature);
        }
        self.commit = commitment.commit.clone();
        self.public_key = Some(commitment.public_key);
        Ok(())
    }

    /// The α challenges a seed induces for a commit proof.
    pub fn commit_challenges(&mut self, seed: &[u8]) -> Result<Vec<i64>, VerifyFailure> {
        self.sample_challenges(seed, self.alpha)
    }

    /// The β challenges a seed induces for a space proof.
    pub fn space_challenges(&mut self, seed: &[u8]) -> Result<Vec<i64>, VerifyFailure> {
        self.sample_challenges(seed, self.beta)
    }

    /// Expand `seed` with SHAKE-256 into `count` indices in
    /// `[0, graph_size)`: each 8-byte window decodes as a signed varint
    /// whose absolute value is reduced modulo the graph size. A pure
    /// function of `(seed, count, graph_size)`; the result is remembered
    /// for subsequent proof checks.
    pub fn sample_challenges(
        &mut self,
        seed: &[u8],
        count: usize,
    ) -> Result<Vec<i64>, VerifyFailure> {
        if seed.len() != SEED_SIZE {
            return Err(VerifyFailure::SeedLength {
                expected: SEED_SIZE,
                got: seed.len(),
            });
        }
        let mut stream = vec![0u8; count * WINDOW];
        shake256(&mut stream, seed);
        let mut challenges = Vec::with_capacity(count);
        for window in stream.chunks(WINDOW) {
            let mut value = decode_i64(window);
            if value < 0 {
                value = -value;
            }
            challenges.push(value % self.graph_size);
        }
        self.challenges = challenges.clone();
        Ok(challenges)
    }

    /// Check a commit proof: proof counts, per-challenge index and Merkle
    /// path, every parent opening (index strictly below the challenge,
    /// path valid), and the recomputation of the challenged node's label
    /// from the public key and the opened parent values.
    pub fn verify_commit(&self, commit_proof: &CommitProof) -> Result<(), VerifyFailure> {
        let public_key = self.public_key.as_ref().ok_or(VerifyFailure::NoCommitment)?;
        if self.challenges.len() != self.alpha {
            return Err(VerifyFailure::NoChallenges);
        }
        if commit_proof.proofs.len() != self.alpha {
            return Err(VerifyFailure::ProofCount {
                expected: self.alpha,
                got: commit_proof.proofs.len(),
            });
        }
        if commit_proof.parent_proofs.len() != self.alpha {
            return Err(VerifyFailure::ParentProofCount {
                expected: self.alpha,
                got: commit_proof.parent_proofs.len(),
            });
        }
        for (i, &c) in self.challenges.iter().enumerate() {
            let proof = &commit_proof.proofs[i];
            if proof.idx != c {
                return Err(VerifyFailure::WrongIndex {
                    expected: c,
                    got: proof.idx,
                });
            }
            if !verify_proof(proof, &self.commit) {
                return Err(VerifyFailure::PathMismatch { idx: c });
            }
            let mut preimage = public_key.as_bytes().to_vec();
            preimage.extend_from_slice(&encode_i64(c));
            for parent in &commit_proof.parent_proofs[i] {
                if parent.idx >= c {
                    return Err(VerifyFailure::ParentIndex {
                        parent: parent.idx,
                        challenge: c,
                    });
                }
                if !verify_proof(parent, &self.commit) {
                    return Err(VerifyFailure::PathMismatch { idx: parent.idx });
                }
                preimage.extend_from_slice(&parent.value);
            }
            if label_digest(&preimage) != proof.value {
                return Err(VerifyFailure::LabelMismatch { idx: c });
            }
        }
        Ok(())
    }

    /// Check a space proof: proof count, then per-challenge index and
    /// Merkle path.
    pub fn verify_space(&self, space_proof: &SpaceProof) -> Result<(), VerifyFailure> {
        if self.public_key.is_none() {
            return Err(VerifyFailure::NoCommitment);
        }
        if self.challenges.len() != self.beta {
            return Err(VerifyFailure::NoChallenges);
        }
        if space_proof.proofs.len() != self.beta {
            return Err(VerifyFailure::ProofCount {
                expected: self.beta,
                got: space_proof.proofs.len(),
            });
        }
        for (i, &c) in self.challenges.iter().enumerate() {
            let proof = &space_proof.proofs[i];
            if proof.idx != c {
                return Err(VerifyFailure::WrongIndex {
                    expected: c,
                    got: proof.idx,
                });
            }
            if !verify_proof(proof, &self.commit) {
                return Err(VerifyFailure::PathMismatch { idx: c });
            }
        }
        Ok(())
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}
