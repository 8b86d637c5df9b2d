//! Corpus-level fingerprint artifact.
//!
//! Bundles the signatures of a batch with the hash family that produced them
//! and the parameters needed to reproduce the run.

use serde::{Deserialize, Serialize};

use crate::config::TailPolicy;
use crate::minhash::{is_degenerate, HashFamily};

/// Signatures for every document in a batch, row `i` for document `i`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorpusFingerprint {
    /// Shingle fingerprints per document, after the tail policy and dedup.
    pub shingles: Vec<Vec<u32>>,
    pub signatures: Vec<Vec<u64>>,
    /// The shared family; comparing signatures from different families is
    /// meaningless.
    pub family: HashFamily,
    pub meta: FingerprintMeta,
}

impl CorpusFingerprint {
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Indices of documents that produced no shingles.
    pub fn degenerate_documents(&self) -> Vec<usize> {
        self.signatures
            .iter()
            .enumerate()
            .filter(|(_, s)| is_degenerate(s))
            .map(|(i, _)| i)
            .collect()
    }
}

/// How a [`CorpusFingerprint`] was produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FingerprintMeta {
    pub perceptual_version: u16,
    pub algorithm_name: String,
    pub shingle_width: usize,
    pub tail_policy: TailPolicy,
    pub num_hashes: u32,
    pub max_shingle_id: u32,
    /// `None` when coefficients came from an unseeded source.
    pub seed: Option<u64>,
    pub use_parallel: bool,
    pub config_version: u32,
}
