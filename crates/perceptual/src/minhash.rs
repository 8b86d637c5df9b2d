//! MinHash signatures over an affine hash family.
//!
//! Hash function `i` is `h_i(x) = (a_i * x + b_i) mod P` with `P` the first
//! prime above `2^32`. Coefficients are drawn once per run and shared by
//! every document, which is what makes signature positions comparable.

use std::collections::HashSet;

use rand::seq::index;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PerceptualError;

/// Modulus of the hash family, the smallest prime greater than `2^32 - 1`.
pub const NEXT_PRIME: u64 = 4_294_967_311;

/// Signature value for a document with no shingles; above every hash output.
pub const SENTINEL: u64 = NEXT_PRIME + 1;

/// Default exclusive upper bound for coefficients.
pub const DEFAULT_MAX_SHINGLE_ID: u32 = u32::MAX;

/// Redraws allowed per coefficient before the sampler stops rejecting and
/// switches to drawing from the remaining ids directly.
pub const MAX_DRAW_ATTEMPTS: usize = 1_000;

/// A family of affine hash functions with pairwise-distinct coefficients
/// within each of the `a` and `b` arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashFamily {
    a: Vec<u32>,
    b: Vec<u32>,
}

impl HashFamily {
    /// Draw `k` functions with coefficients in `[0, max_id)`.
    pub fn generate<R: Rng>(k: u32, max_id: u32, rng: &mut R) -> Result<Self, PerceptualError> {
        if k == 0 {
            return Err(PerceptualError::InvalidHashCount { count: k });
        }
        if k > max_id {
            return Err(PerceptualError::HashFamilyTooLarge { count: k, max_id });
        }
        let a = draw_unique(k as usize, max_id, rng);
        let b = draw_unique(k as usize, max_id, rng);
        Ok(Self { a, b })
    }

    /// Build a family from explicit coefficients.
    pub fn from_coefficients(a: Vec<u32>, b: Vec<u32>) -> Result<Self, PerceptualError> {
        if a.len() != b.len() {
            return Err(PerceptualError::CoefficientLengthMismatch {
                a: a.len(),
                b: b.len(),
            });
        }
        if a.is_empty() {
            return Err(PerceptualError::InvalidHashCount { count: 0 });
        }
        for coeffs in [&a, &b] {
            let mut seen = HashSet::with_capacity(coeffs.len());
            if let Some(&value) = coeffs.iter().find(|&&c| !seen.insert(c)) {
                return Err(PerceptualError::DuplicateCoefficient { value });
            }
        }
        Ok(Self { a, b })
    }

    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    pub fn coefficients(&self) -> (&[u32], &[u32]) {
        (&self.a, &self.b)
    }

    /// `h_i(shingle)`. Panics if `i >= self.len()`.
    #[inline]
    pub fn hash(&self, i: usize, shingle: u32) -> u64 {
        universal_hash(self.a[i], self.b[i], shingle)
    }

    /// Signature of one shingle multiset; all [`SENTINEL`] when it is empty.
    pub fn signature(&self, shingles: &[u32]) -> Vec<u64> {
        self.a
            .iter()
            .zip(&self.b)
            .map(|(&a, &b)| {
                shingles
                    .iter()
                    .map(|&x| universal_hash(a, b, x))
                    .min()
                    .unwrap_or(SENTINEL)
            })
            .collect()
    }

    /// Signatures for a whole corpus; output index `i` belongs to `sets[i]`.
    pub fn signatures(&self, sets: &[Vec<u32>], use_parallel: bool) -> Vec<Vec<u64>> {
        let signatures: Vec<Vec<u64>> = if use_parallel {
            sets.par_iter().map(|s| self.signature(s)).collect()
        } else {
            sets.iter().map(|s| self.signature(s)).collect()
        };

        debug!(
            documents = signatures.len(),
            hashes = self.len(),
            degenerate = signatures.iter().filter(|s| is_degenerate(s)).count(),
            "signatures_generated"
        );
        signatures
    }
}

/// `(a * x + b) mod P`.
///
/// With all three operands below `2^32` the intermediate is at most
/// `(2^32 - 1)^2 + (2^32 - 1) = 2^64 - 2^32`, which fits in `u64`.
#[inline]
pub fn universal_hash(a: u32, b: u32, x: u32) -> u64 {
    (u64::from(a) * u64::from(x) + u64::from(b)) % NEXT_PRIME
}

/// True for the signature of a document without shingles.
pub fn is_degenerate(signature: &[u64]) -> bool {
    !signature.is_empty() && signature.iter().all(|&v| v == SENTINEL)
}

/// Draw `count` distinct values from `[0, max_id)`.
///
/// Sparse requests use rejection sampling. Once the id space is at least
/// half taken, or a coefficient needs more than [`MAX_DRAW_ATTEMPTS`]
/// redraws, the rest comes from a sample without replacement, so any
/// `count <= max_id` succeeds.
fn draw_unique<R: Rng>(count: usize, max_id: u32, rng: &mut R) -> Vec<u32> {
    let space = max_id as usize;
    if count.saturating_mul(2) > space {
        return sample_without_replacement(rng, space, count);
    }

    let mut seen = HashSet::with_capacity(count);
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let mut attempts = 0;
        loop {
            let candidate = rng.random_range(0..max_id);
            if seen.insert(candidate) {
                out.push(candidate);
                break;
            }
            attempts += 1;
            if attempts >= MAX_DRAW_ATTEMPTS {
                debug!(
                    attempts,
                    drawn = out.len(),
                    requested = count,
                    "coefficient_redraws_exhausted"
                );
                return sample_without_replacement(rng, space, count);
            }
        }
    }
    out
}

fn sample_without_replacement<R: Rng>(rng: &mut R, space: usize, count: usize) -> Vec<u32> {
    // Every index is below `space`, which came from a u32.
    index::sample(rng, space, count)
        .into_iter()
        .map(|i| i as u32)
        .collect()
}

/// Generate a fresh hash family from `rng` and sign every shingle set.
pub fn generate_signatures<R: Rng>(
    shingle_sets: &[Vec<u32>],
    hash_count: u32,
    max_shingle_id: u32,
    rng: &mut R,
) -> Result<Vec<Vec<u64>>, PerceptualError> {
    let family = HashFamily::generate(hash_count, max_shingle_id, rng)?;
    Ok(family.signatures(shingle_sets, false))
}
