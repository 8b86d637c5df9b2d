use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a similarity is compared against the suspicion threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdComparison {
    /// `similarity > threshold`; a pair sitting exactly on the threshold
    /// contributes nothing.
    #[default]
    Exclusive,
    /// `similarity >= threshold`.
    Inclusive,
}

impl ThresholdComparison {
    #[inline]
    pub fn passes(self, similarity: f64, threshold: f64) -> bool {
        match self {
            ThresholdComparison::Exclusive => similarity > threshold,
            ThresholdComparison::Inclusive => similarity >= threshold,
        }
    }
}

/// Parameters of the rating aggregation.
///
/// Every pair above the threshold adds `similarity * multiplier + bonus` to
/// both of its documents, where the multiplier is `same_sender_coeff` when
/// the two documents share a sender and `1` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingConfig {
    /// Suspicion threshold in `[0.0, 1.0]`.
    #[serde(default = "RatingConfig::default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub comparison: ThresholdComparison,
    /// Multiplier applied when both documents come from the same sender.
    #[serde(default = "RatingConfig::default_same_sender_coeff")]
    pub same_sender_coeff: f64,
    /// Flat amount added per suspicious pair on top of the scaled similarity.
    #[serde(default = "RatingConfig::default_bonus")]
    pub bonus: f64,
    /// Scan matrix rows on the rayon pool.
    #[serde(default)]
    pub use_parallel: bool,
}

impl RatingConfig {
    pub(crate) fn default_threshold() -> f64 {
        0.4
    }

    pub(crate) fn default_same_sender_coeff() -> f64 {
        2.0
    }

    pub(crate) fn default_bonus() -> f64 {
        0.1
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_comparison(mut self, comparison: ThresholdComparison) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn with_same_sender_coeff(mut self, coeff: f64) -> Self {
        self.same_sender_coeff = coeff;
        self
    }

    pub fn with_bonus(mut self, bonus: f64) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    pub fn validate(&self) -> Result<(), RatingError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(RatingError::InvalidConfig(format!(
                "threshold must be between 0.0 and 1.0 (got {})",
                self.threshold
            )));
        }
        if !self.same_sender_coeff.is_finite() || self.same_sender_coeff < 0.0 {
            return Err(RatingError::InvalidConfig(format!(
                "same_sender_coeff must be a finite value >= 0.0 (got {})",
                self.same_sender_coeff
            )));
        }
        if !self.bonus.is_finite() || self.bonus < 0.0 {
            return Err(RatingError::InvalidConfig(format!(
                "bonus must be a finite value >= 0.0 (got {})",
                self.bonus
            )));
        }
        Ok(())
    }

    /// Rating added to each document of a pair, or `None` below threshold.
    #[inline]
    pub fn contribution(&self, similarity: f64, same_sender: bool) -> Option<f64> {
        if !self.comparison.passes(similarity, self.threshold) {
            return None;
        }
        let multiplier = if same_sender {
            self.same_sender_coeff
        } else {
            1.0
        };
        Some(similarity * multiplier + self.bonus)
    }
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            threshold: Self::default_threshold(),
            comparison: ThresholdComparison::default(),
            same_sender_coeff: Self::default_same_sender_coeff(),
            bonus: Self::default_bonus(),
            use_parallel: false,
        }
    }
}

/// Final suspicion score of one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRating {
    pub id: String,
    pub rating: f64,
}

/// A pair whose similarity crossed the threshold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuspiciousPair {
    pub first: String,
    pub second: String,
    pub similarity: f64,
    pub same_sender: bool,
    /// Amount added to each of the two ratings.
    pub contribution: f64,
}

/// Output of a rating run, in corpus order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RatingReport {
    /// Mean rating over every document, zeros included. `None` when the
    /// corpus has fewer than two documents and so no pairs.
    pub average_rating: Option<f64>,
    pub ratings: Vec<DocumentRating>,
    pub suspicious_pairs: Vec<SuspiciousPair>,
}

impl RatingReport {
    pub fn rating(&self, id: &str) -> Option<f64> {
        self.ratings.iter().find(|r| r.id == id).map(|r| r.rating)
    }

    /// Ids rated strictly above the corpus average.
    pub fn above_average(&self) -> Vec<&str> {
        let Some(avg) = self.average_rating else {
            return Vec::new();
        };
        self.ratings
            .iter()
            .filter(|r| r.rating > avg)
            .map(|r| r.id.as_str())
            .collect()
    }

    pub fn has_pairs(&self) -> bool {
        self.average_rating.is_some()
    }
}

/// Errors that can occur while aggregating ratings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RatingError {
    #[error("invalid rating config: {0}")]
    InvalidConfig(String),

    #[error("similarity matrix covers {matrix} documents but corpus has {corpus}")]
    DimensionMismatch { matrix: usize, corpus: usize },
}
