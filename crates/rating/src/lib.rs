//! # Samemail Rating (`rating`)
//!
//! ## Purpose
//!
//! `rating` is the last stage of the samemail pipeline. It takes the pairwise
//! similarity estimates produced by `perceptual` and the [`ingest::Corpus`]
//! they were computed for, and turns them into one suspicion score per
//! document plus the corpus-wide average.
//!
//! A pair `(i, j)` whose similarity passes the threshold adds
//! `similarity * multiplier + bonus` to both ratings. The multiplier is the
//! configured same-sender coefficient when both documents carry the same
//! sender, and `1` otherwise.
//!
//! ## Core Types
//!
//! - [`RatingConfig`]: threshold, comparison mode, same-sender coefficient,
//!   bonus and parallelism.
//! - [`ThresholdComparison`]: `Exclusive` (`>`, default) or `Inclusive` (`>=`).
//! - [`RatingReport`]: ratings in corpus order, the average rating, and every
//!   pair that crossed the threshold.
//! - [`RatingError`]: invalid config or a matrix that does not fit the corpus.
//!
//! ## Example Usage
//!
//! ```
//! use ingest::{Corpus, Document};
//! use perceptual::SimilarityMatrix;
//! use rating::{aggregate_ratings, RatingConfig};
//!
//! let corpus = Corpus::from_documents([
//!     Document::new("a", "").with_sender("x@example.com"),
//!     Document::new("b", "").with_sender("x@example.com"),
//! ])
//! .unwrap();
//! let sims = SimilarityMatrix::from_dense(&[vec![0.0, 0.5], vec![0.0, 0.0]]).unwrap();
//!
//! let report = aggregate_ratings(&sims, &corpus, &RatingConfig::default()).unwrap();
//! assert_eq!(report.rating("a"), Some(0.5 * 2.0 + 0.1));
//! ```

pub mod engine;
pub mod types;

pub use crate::engine::aggregate_ratings;
pub use crate::types::{
    DocumentRating, RatingConfig, RatingError, RatingReport, SuspiciousPair, ThresholdComparison,
};
