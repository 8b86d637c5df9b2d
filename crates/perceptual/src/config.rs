//! Configuration and error types for the perceptual layer.
//!
//! Nothing in here touches I/O or the environment: shingling, signatures and
//! similarity are a pure function of `(documents, config)` once a seed is
//! fixed.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::minhash::DEFAULT_MAX_SHINGLE_ID;

/// What to do with the windows at the end of a document that are shorter
/// than the shingle width.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TailPolicy {
    /// Only full-width windows become shingles.
    #[default]
    Drop,
    /// Short tail windows are fingerprinted from the tokens they contain.
    Keep,
}

/// Shingling parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShingleConfig {
    /// Tokens per window.
    pub width: usize,
    pub tail_policy: TailPolicy,
    /// Collapse repeated fingerprints within a document.
    ///
    /// Signatures are identical either way since a minimum ignores
    /// multiplicity; this only trims the work done per hash function.
    pub dedup: bool,
}

impl ShingleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_tail_policy(mut self, tail_policy: TailPolicy) -> Self {
        self.tail_policy = tail_policy;
        self
    }

    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.width == 0 {
            return Err(PerceptualError::InvalidShingleWidth { width: self.width });
        }
        Ok(())
    }
}

impl Default for ShingleConfig {
    fn default() -> Self {
        Self {
            width: 3,
            tail_policy: TailPolicy::Drop,
            dedup: false,
        }
    }
}

/// Configuration for the shingle → signature → similarity pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PerceptualConfig {
    /// Configuration schema version.
    ///
    /// Any change that can alter signatures for the same seed must bump this.
    pub version: u32,
    pub shingle: ShingleConfig,
    /// Number of hash functions, i.e. signature length.
    pub num_hashes: u32,
    /// Exclusive upper bound for hash-family coefficients.
    pub max_shingle_id: u32,
    /// Seed for coefficient sampling. `None` draws a fresh family from the OS
    /// random source on every run.
    pub seed: Option<u64>,
    /// Compute per-document work and similarity rows on the rayon pool.
    pub use_parallel: bool,
}

impl PerceptualConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shingle(mut self, shingle: ShingleConfig) -> Self {
        self.shingle = shingle;
        self
    }

    /// Set the signature length. Estimator error shrinks as `1/sqrt(n)`.
    pub fn with_num_hashes(mut self, num_hashes: u32) -> Self {
        self.num_hashes = num_hashes;
        self
    }

    pub fn with_max_shingle_id(mut self, max_shingle_id: u32) -> Self {
        self.max_shingle_id = max_shingle_id;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.version < 1 {
            return Err(PerceptualError::InvalidConfigVersion {
                version: self.version,
            });
        }
        self.shingle.validate()?;
        if self.num_hashes == 0 {
            return Err(PerceptualError::InvalidHashCount {
                count: self.num_hashes,
            });
        }
        if self.num_hashes > self.max_shingle_id {
            return Err(PerceptualError::HashFamilyTooLarge {
                count: self.num_hashes,
                max_id: self.max_shingle_id,
            });
        }
        Ok(())
    }

    /// Random source for coefficient sampling.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

impl Default for PerceptualConfig {
    fn default() -> Self {
        Self {
            version: 1,
            shingle: ShingleConfig::default(),
            num_hashes: 25,
            max_shingle_id: DEFAULT_MAX_SHINGLE_ID,
            seed: None,
            use_parallel: false,
        }
    }
}

/// Errors returned by the perceptual layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PerceptualError {
    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },

    #[error("invalid config: shingle width must be >= 1 (got {width})")]
    InvalidShingleWidth { width: usize },

    #[error("invalid config: hash count must be >= 1 (got {count})")]
    InvalidHashCount { count: u32 },

    #[error("cannot draw {count} distinct coefficients below {max_id}")]
    HashFamilyTooLarge { count: u32, max_id: u32 },

    #[error("coefficient arrays differ in length: a={a}, b={b}")]
    CoefficientLengthMismatch { a: usize, b: usize },

    #[error("duplicate coefficient {value} in hash family")]
    DuplicateCoefficient { value: u32 },

    #[error("similarity matrix row {row} has length {found}, expected at least {expected}")]
    MatrixRowTooShort {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("similarity matrix over {documents} documents needs {expected} cells, got {found}")]
    MatrixCellCount {
        documents: usize,
        expected: usize,
        found: usize,
    },

    #[error("signature {index} has length {found}, expected {expected}")]
    SignatureLengthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("signatures are empty; cannot estimate similarity")]
    EmptySignature,
}
