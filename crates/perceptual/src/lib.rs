//! # Samemail Perceptual Layer
//!
//! Turns document text into fixed-size MinHash signatures and estimates
//! pairwise Jaccard similarity from them.
//!
//! ## Contract
//!
//! - Input is document content as `&str`; ids and senders never reach this
//!   crate.
//! - No I/O, clocks or global state. Randomness enters only through the
//!   `Rng` passed in (or the seed in [`PerceptualConfig`]).
//!
//! Invariant: for the same contents, the same config and the same seed, the
//! signatures and similarity matrix are bit identical.
//!
//! ## Core Pipeline
//!
//! 1.  **Shingling**: content is lowercased, split on single spaces, cut into
//!     overlapping 3-token windows, and each window is hashed to 32 bits.
//!
//! 2.  **MinHashing**: one [`HashFamily`] of affine functions
//!     `(a * x + b) mod P` is drawn for the batch; each document's signature
//!     holds, per function, the minimum over its shingles.
//!
//! 3.  **Estimation**: for every pair `i < j`, the fraction of positions at
//!     which the signatures agree. Standard error shrinks as `1/sqrt(k)`.
//!
//! ## Example Usage
//!
//! ```
//! use perceptual::{calculate_similarities, fingerprint_corpus, PerceptualConfig};
//!
//! let docs = [
//!     "you have won a brand new car claim it now",
//!     "you have won a brand new car claim it today",
//!     "minutes of the quarterly planning meeting",
//! ];
//! let cfg = PerceptualConfig::default().with_num_hashes(64).with_seed(7);
//!
//! let fp = fingerprint_corpus(&docs, &cfg).unwrap();
//! let sims = calculate_similarities(&fp.signatures).unwrap();
//!
//! assert!(sims.get(0, 1) > sims.get(0, 2));
//! ```
use std::time::Instant;

use rand::Rng;
use tracing::{debug, info};

pub mod config;
pub mod fingerprint;
mod minhash;
mod shingles;
mod similarity;

pub use crate::config::{PerceptualConfig, PerceptualError, ShingleConfig, TailPolicy};
pub use crate::fingerprint::{CorpusFingerprint, FingerprintMeta};
pub use crate::minhash::{
    generate_signatures, is_degenerate, universal_hash, HashFamily, DEFAULT_MAX_SHINGLE_ID,
    MAX_DRAW_ATTEMPTS, NEXT_PRIME, SENTINEL,
};
pub use crate::shingles::{fingerprint, make_ngrams, make_shingles, make_shingles_batch, tokenize};
pub use crate::similarity::{
    calculate_similarities, calculate_similarities_with, positional_match_count, SimilarityMatrix,
};

/// Current perceptual algorithm version for this crate.
pub const PERCEPTUAL_VERSION: u16 = 1;

/// Human‑readable algorithm identifier.
pub const PERCEPTUAL_ALGORITHM: &str = "word3_xxh32_affine_minhash_v1";

/// Shingle and sign a batch of documents using the config's random source.
pub fn fingerprint_corpus<S>(
    contents: &[S],
    cfg: &PerceptualConfig,
) -> Result<CorpusFingerprint, PerceptualError>
where
    S: AsRef<str> + Sync,
{
    cfg.validate()?;
    let mut rng = cfg.rng();
    fingerprint_corpus_with_rng(contents, cfg, &mut rng)
}

/// Like [`fingerprint_corpus`], drawing coefficients from `rng` instead.
///
/// `cfg.seed` is recorded in the metadata but not used.
pub fn fingerprint_corpus_with_rng<S, R>(
    contents: &[S],
    cfg: &PerceptualConfig,
    rng: &mut R,
) -> Result<CorpusFingerprint, PerceptualError>
where
    S: AsRef<str> + Sync,
    R: Rng,
{
    cfg.validate()?;
    let start = Instant::now();

    // Step 1: shingles per document, independent of each other.
    let shingles = make_shingles_batch(contents, &cfg.shingle, cfg.use_parallel);
    debug!(
        documents = shingles.len(),
        total_shingles = shingles.iter().map(Vec::len).sum::<usize>(),
        "shingles_extracted"
    );

    // Step 2: one family for the whole batch, then one signature per document.
    let family = HashFamily::generate(cfg.num_hashes, cfg.max_shingle_id, rng)?;
    let signatures = family.signatures(&shingles, cfg.use_parallel);

    let fp = CorpusFingerprint {
        shingles,
        signatures,
        family,
        meta: FingerprintMeta {
            perceptual_version: PERCEPTUAL_VERSION,
            algorithm_name: PERCEPTUAL_ALGORITHM.to_string(),
            shingle_width: cfg.shingle.width,
            tail_policy: cfg.shingle.tail_policy,
            num_hashes: cfg.num_hashes,
            max_shingle_id: cfg.max_shingle_id,
            seed: cfg.seed,
            use_parallel: cfg.use_parallel,
            config_version: cfg.version,
        },
    };

    info!(
        documents = fp.len(),
        hashes = cfg.num_hashes,
        degenerate = fp.degenerate_documents().len(),
        elapsed_micros = start.elapsed().as_micros(),
        "corpus_fingerprinted"
    );
    Ok(fp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn words(prefix: &str, n: usize) -> String {
        (0..n)
            .map(|i| format!("{prefix}{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn fingerprint_corpus_validates_config() {
        let cfg = PerceptualConfig::default().with_num_hashes(0);
        assert_eq!(
            fingerprint_corpus(&["a b c"], &cfg),
            Err(PerceptualError::InvalidHashCount { count: 0 })
        );
    }

    #[test]
    fn fingerprint_corpus_records_meta() {
        let cfg = PerceptualConfig::default().with_seed(3).with_num_hashes(10);
        let fp = fingerprint_corpus(&["a b c d", ""], &cfg).unwrap();
        assert_eq!(fp.len(), 2);
        assert_eq!(fp.family.len(), 10);
        assert_eq!(fp.meta.seed, Some(3));
        assert_eq!(fp.meta.num_hashes, 10);
        assert_eq!(fp.meta.algorithm_name, PERCEPTUAL_ALGORITHM);
        assert_eq!(fp.shingles[0].len(), 2);
        assert_eq!(fp.degenerate_documents(), vec![1]);
    }

    #[test]
    fn same_document_rehashed_is_exactly_similar() {
        let text = words("w", 40);
        let cfg = PerceptualConfig::default().with_seed(11);
        let fp = fingerprint_corpus(&[text.as_str(), text.as_str()], &cfg).unwrap();
        let sims = calculate_similarities(&fp.signatures).unwrap();
        assert_eq!(sims.get(0, 1), 1.0);
    }

    #[test]
    fn disjoint_vocabularies_are_dissimilar() {
        let a = words("alpha", 400);
        let b = words("beta", 400);
        let cfg = PerceptualConfig::default().with_num_hashes(128).with_seed(5);
        let fp = fingerprint_corpus(&[a, b], &cfg).unwrap();
        let sims = calculate_similarities(&fp.signatures).unwrap();
        assert!(sims.get(0, 1) < 0.05, "got {}", sims.get(0, 1));
    }

    #[test]
    fn disjoint_vocabularies_stay_dissimilar_across_seeds() {
        let a = words("alpha", 200);
        let b = words("beta", 200);
        for seed in 0..20 {
            let cfg = PerceptualConfig::default().with_num_hashes(64).with_seed(seed);
            let fp = fingerprint_corpus(&[a.as_str(), b.as_str()], &cfg).unwrap();
            let estimate = calculate_similarities(&fp.signatures).unwrap().get(0, 1);
            assert!(estimate < 0.05, "seed {seed}: got {estimate}");
        }
    }

    fn estimate_variance(a: &str, b: &str, num_hashes: u32, seeds: u64) -> f64 {
        let estimates: Vec<f64> = (0..seeds)
            .map(|seed| {
                let cfg = PerceptualConfig::default()
                    .with_num_hashes(num_hashes)
                    .with_seed(seed);
                let fp = fingerprint_corpus(&[a, b], &cfg).unwrap();
                calculate_similarities(&fp.signatures).unwrap().get(0, 1)
            })
            .collect();
        let mean = estimates.iter().sum::<f64>() / estimates.len() as f64;
        estimates.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / (estimates.len() - 1) as f64
    }

    #[test]
    fn estimate_variance_shrinks_with_hash_count() {
        // Jaccard ~1/3; the estimator variance is J(1-J)/k.
        let shared = words("s", 102);
        let a = format!("{shared} {}", words("a", 100));
        let b = format!("{shared} {}", words("b", 100));

        let small = estimate_variance(&a, &b, 16, 120);
        let large = estimate_variance(&a, &b, 256, 120);
        let ratio = small / large;
        // 256 / 16 = 16; allow for sampling noise in the variance estimates.
        assert!(
            (5.0..50.0).contains(&ratio),
            "variance k=16: {small}, k=256: {large}, ratio {ratio}"
        );
        assert!(large < 3.0 * (2.0 / 9.0) / 256.0, "k=256 variance {large}");
    }

    #[test]
    fn hash_count_equal_to_id_space_is_accepted() {
        let cfg = PerceptualConfig::default()
            .with_num_hashes(2_000)
            .with_max_shingle_id(2_000);
        assert!(cfg.validate().is_ok());
        for seed in 0..10 {
            let fp = fingerprint_corpus(&["a b c d e"], &cfg.clone().with_seed(seed)).unwrap();
            assert_eq!(fp.signatures[0].len(), 2_000);
        }
    }

    #[test]
    fn estimate_tracks_jaccard() {
        // 100 shared windows out of ~300 distinct in the union.
        let shared = words("s", 102);
        let a = format!("{shared} {}", words("a", 100));
        let b = format!("{shared} {}", words("b", 100));
        let cfg = PerceptualConfig::default().with_num_hashes(400).with_seed(21);
        let fp = fingerprint_corpus(&[a, b], &cfg).unwrap();
        let estimate = calculate_similarities(&fp.signatures).unwrap().get(0, 1);
        assert!(
            (0.2..0.5).contains(&estimate),
            "estimate {estimate} far from expected ~0.33"
        );
    }

    #[test]
    fn explicit_rng_matches_seeded_config() {
        let cfg = PerceptualConfig::default().with_seed(77);
        let docs = ["one two three four", "two three four five"];
        let a = fingerprint_corpus(&docs, &cfg).unwrap();
        let b = fingerprint_corpus_with_rng(&docs, &cfg, &mut StdRng::seed_from_u64(77)).unwrap();
        assert_eq!(a.signatures, b.signatures);
        assert_eq!(a.family, b.family);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let docs: Vec<String> = (0..20).map(|i| words(&format!("d{}", i % 4), 30)).collect();
        let seq = PerceptualConfig::default().with_seed(9);
        let par = seq.clone().with_parallel(true);
        let a = fingerprint_corpus(&docs, &seq).unwrap();
        let b = fingerprint_corpus(&docs, &par).unwrap();
        assert_eq!(a.signatures, b.signatures);
    }
}
