//! Block sub-records, following the Spacemint block layout.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};

use pospace::encoding;
use pospace::{CommitProof, Commitment, SpaceProof};

use crate::Result;

/// A full block: the three sub-records share the block id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub hash_sub: SubHash,
    pub signature_sub: SubSignature,
    pub tx_sub: SubTx,
}

impl Block {
    /// Assemble and sign the block following `prev`.
    pub fn new(
        block_id: i64,
        prev: &Block,
        signing_key: &SigningKey,
        commit_proof: CommitProof,
        space_proof: SpaceProof,
        txs: Vec<Tx>,
    ) -> Result<Self> {
        let hash_sub = SubHash::new(
            block_id,
            &prev.hash_sub.serialize()?,
            signing_key,
            commit_proof,
            space_proof,
        );
        let tx_sub = SubTx { block_id, txs };
        let signature_sub = SubSignature::new(
            block_id,
            &prev.signature_sub.serialize()?,
            signing_key,
            &tx_sub,
        )?;
        Ok(Self {
            hash_sub,
            signature_sub,
            tx_sub,
        })
    }

    /// The first block of a chain signs empty predecessor records.
    pub fn genesis(
        signing_key: &SigningKey,
        commit_proof: CommitProof,
        space_proof: SpaceProof,
        txs: Vec<Tx>,
    ) -> Result<Self> {
        let hash_sub = SubHash::new(0, &[], signing_key, commit_proof, space_proof);
        let tx_sub = SubTx { block_id: 0, txs };
        let signature_sub = SubSignature::new(0, &[], signing_key, &tx_sub)?;
        Ok(Self {
            hash_sub,
            signature_sub,
            tx_sub,
        })
    }

    pub fn block_id(&self) -> i64 {
        self.hash_sub.block_id
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// The hash sub-record: both proofs plus a signature over the previous
/// hash sub-record's serialization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubHash {
    pub block_id: i64,
    pub commit_proof: CommitProof,
    pub space_proof: SpaceProof,
    #[serde(with = "encoding::base64_signature")]
    pub signature: Signature,
}

impl SubHash {
    fn new(
        block_id: i64,
        prev_serialized: &[u8],
        signing_key: &SigningKey,
        commit_proof: CommitProof,
        space_proof: SpaceProof,
    ) -> Self {
        Self {
            block_id,
            commit_proof,
            space_proof,
            signature: signing_key.sign(prev_serialized),
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// The signature sub-record: signatures over the previous signature
/// sub-record and the current transaction sub-record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubSignature {
    pub block_id: i64,
    #[serde(with = "encoding::base64_signature")]
    pub sig_sig: Signature,
    #[serde(with = "encoding::base64_signature")]
    pub sig_tx: Signature,
}

impl SubSignature {
    fn new(
        block_id: i64,
        prev_serialized: &[u8],
        signing_key: &SigningKey,
        tx_sub: &SubTx,
    ) -> Result<Self> {
        Ok(Self {
            block_id,
            sig_sig: signing_key.sign(prev_serialized),
            sig_tx: signing_key.sign(&tx_sub.serialize()?),
        })
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// The transaction sub-record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubTx {
    pub block_id: i64,
    pub txs: Vec<Tx>,
}

impl SubTx {
    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Chain transactions.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tx {
    Payment {
        ins: Vec<In>,
        outs: Vec<Out>,
        tx_id: i64,
    },
    Commitment {
        commitment: Commitment,
        #[serde(with = "encoding::base64_pubkey")]
        public_key: VerifyingKey,
        tx_id: i64,
    },
    Punishment {
        tx_id: i64,
    },
}

/// A payment input, signed by the spender.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct In {
    #[serde(with = "encoding::base64_pubkey")]
    pub public_key: VerifyingKey,
    #[serde(with = "encoding::base64_signature")]
    pub signature: Signature,
    pub tx_id: i64,
}

/// A payment output.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Out {
    #[serde(with = "encoding::base64_pubkey")]
    pub public_key: VerifyingKey,
    pub value: i64,
}
