//! Pairwise similarity estimation from MinHash signatures.
//!
//! The estimate for a pair is the fraction of signature positions holding
//! the same minimum. Only the upper triangle (`i < j`) is materialized.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PerceptualError;

/// Number of positions at which `a` and `b` hold equal elements, compared
/// over the shorter of the two.
pub fn positional_match_count<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x == y).count()
}

/// Upper-triangular `n × n` similarity matrix, packed row by row.
///
/// Reading any cell with `i >= j` yields `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PackedMatrix")]
pub struct SimilarityMatrix {
    n: usize,
    values: Vec<f64>,
}

/// Wire shape of [`SimilarityMatrix`], checked before it becomes one.
#[derive(Deserialize)]
struct PackedMatrix {
    n: usize,
    values: Vec<f64>,
}

impl TryFrom<PackedMatrix> for SimilarityMatrix {
    type Error = PerceptualError;

    fn try_from(raw: PackedMatrix) -> Result<Self, Self::Error> {
        let expected = triangle_cells(raw.n);
        if raw.values.len() != expected {
            return Err(PerceptualError::MatrixCellCount {
                documents: raw.n,
                expected,
                found: raw.values.len(),
            });
        }
        Ok(Self {
            n: raw.n,
            values: raw.values,
        })
    }
}

fn triangle_cells(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

impl SimilarityMatrix {
    /// All-zero matrix over `n` documents.
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            values: vec![0.0; triangle_cells(n)],
        }
    }

    /// Build from a dense square matrix, reading only the upper triangle.
    ///
    /// Every row must be at least as long as the number of rows.
    pub fn from_dense(rows: &[Vec<f64>]) -> Result<Self, PerceptualError> {
        let n = rows.len();
        let mut matrix = Self::zeros(n);
        for (i, row) in rows.iter().enumerate() {
            if row.len() < n {
                return Err(PerceptualError::MatrixRowTooShort {
                    row: i,
                    expected: n,
                    found: row.len(),
                });
            }
            for j in (i + 1)..n {
                matrix.set(i, j, row[j]);
            }
        }
        Ok(matrix)
    }

    /// Number of documents (rows).
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        // Rows 0..i hold (n-1) + (n-2) + ... + (n-i) cells.
        i * self.n - i * (i + 1) / 2 + (j - i - 1)
    }

    /// Estimate for the pair `(i, j)`; `0.0` when `i >= j`.
    ///
    /// Panics if `j` is out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i >= j {
            return 0.0;
        }
        assert!(j < self.n, "column {j} out of range for {} documents", self.n);
        self.values[self.offset(i, j)]
    }

    /// Panics unless `i < j < len()`.
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        assert!(i < j && j < self.n, "cell ({i}, {j}) is not in the upper triangle");
        let idx = self.offset(i, j);
        self.values[idx] = value;
    }

    /// Every populated cell as `(i, j, similarity)`, row-major.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let n = self.n;
        (0..n)
            .flat_map(move |i| ((i + 1)..n).map(move |j| (i, j)))
            .zip(self.values.iter().copied())
            .map(|((i, j), s)| (i, j, s))
    }

    /// Full square matrix with zeros on and below the diagonal.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        let mut dense = vec![vec![0.0; self.n]; self.n];
        for (i, j, s) in self.pairs() {
            dense[i][j] = s;
        }
        dense
    }
}

/// Estimate similarities for every unordered pair of signatures.
pub fn calculate_similarities(signatures: &[Vec<u64>]) -> Result<SimilarityMatrix, PerceptualError> {
    calculate_similarities_with(signatures, false)
}

/// Like [`calculate_similarities`], optionally computing rows on the rayon
/// pool. Each row is produced by a single task, so no cell is shared.
pub fn calculate_similarities_with(
    signatures: &[Vec<u64>],
    use_parallel: bool,
) -> Result<SimilarityMatrix, PerceptualError> {
    let n = signatures.len();
    if n < 2 {
        return Ok(SimilarityMatrix::zeros(n));
    }

    let k = signatures[0].len();
    if let Some((index, sig)) = signatures.iter().enumerate().find(|(_, s)| s.len() != k) {
        return Err(PerceptualError::SignatureLengthMismatch {
            index,
            expected: k,
            found: sig.len(),
        });
    }
    if k == 0 {
        return Err(PerceptualError::EmptySignature);
    }

    let row = |i: usize| -> Vec<f64> {
        let first = &signatures[i];
        signatures[i + 1..]
            .iter()
            .map(|second| positional_match_count(first, second) as f64 / k as f64)
            .collect()
    };

    let rows: Vec<Vec<f64>> = if use_parallel {
        (0..n - 1).into_par_iter().map(row).collect()
    } else {
        (0..n - 1).map(row).collect()
    };

    let values: Vec<f64> = rows.into_iter().flatten().collect();
    debug!(documents = n, pairs = values.len(), hashes = k, "similarities_estimated");
    Ok(SimilarityMatrix { n, values })
}
