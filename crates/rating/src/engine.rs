use std::time::Instant;

use ingest::Corpus;
use perceptual::SimilarityMatrix;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::types::{DocumentRating, RatingConfig, RatingError, RatingReport, SuspiciousPair};


/// Index-level view of a pair that crossed the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Hit {
    i: usize,
    j: usize,
    similarity: f64,
    same_sender: bool,
    contribution: f64,
}

/// Aggregate suspicion ratings for `corpus` from its similarity matrix.
///
/// Row `i` of the matrix must describe `corpus.get(i)`.
pub fn aggregate_ratings(
    similarities: &SimilarityMatrix,
    corpus: &Corpus,
    cfg: &RatingConfig,
) -> Result<RatingReport, RatingError> {
    cfg.validate()?;
    if similarities.len() != corpus.len() {
        let err = RatingError::DimensionMismatch {
            matrix: similarities.len(),
            corpus: corpus.len(),
        };
        warn!(error = %err, "rating_failure");
        return Err(err);
    }

    let start = Instant::now();
    let n = corpus.len();
    let hits = scan_pairs(similarities, corpus, cfg);

    // Workers only collect hits; the sums happen here, in row-major order,
    // so parallel and sequential runs produce identical ratings.
    let mut totals = vec![0.0f64; n];
    for hit in &hits {
        totals[hit.i] += hit.contribution;
        totals[hit.j] += hit.contribution;
    }

    let average_rating = if n < 2 {
        None
    } else {
        Some(totals.iter().sum::<f64>() / n as f64)
    };

    let ratings = corpus
        .iter()
        .zip(totals)
        .map(|(doc, rating)| DocumentRating {
            id: doc.id.clone(),
            rating,
        })
        .collect();

    let suspicious_pairs = hits
        .iter()
        .map(|hit| SuspiciousPair {
            first: corpus.documents()[hit.i].id.clone(),
            second: corpus.documents()[hit.j].id.clone(),
            similarity: hit.similarity,
            same_sender: hit.same_sender,
            contribution: hit.contribution,
        })
        .collect::<Vec<_>>();

    info!(
        documents = n,
        suspicious_pairs = suspicious_pairs.len(),
        average_rating = ?average_rating,
        elapsed_micros = start.elapsed().as_micros(),
        "ratings_aggregated"
    );

    Ok(RatingReport {
        average_rating,
        ratings,
        suspicious_pairs,
    })
}

fn scan_row(i: usize, similarities: &SimilarityMatrix, corpus: &Corpus, cfg: &RatingConfig) -> Vec<Hit> {
    ((i + 1)..similarities.len())
        .filter_map(|j| {
            let similarity = similarities.get(i, j);
            let same_sender = corpus.same_sender(i, j);
            cfg.contribution(similarity, same_sender)
                .map(|contribution| Hit {
                    i,
                    j,
                    similarity,
                    same_sender,
                    contribution,
                })
        })
        .collect()
}

fn scan_pairs(similarities: &SimilarityMatrix, corpus: &Corpus, cfg: &RatingConfig) -> Vec<Hit> {
    let rows = similarities.len().saturating_sub(1);
    if cfg.use_parallel {
        (0..rows)
            .into_par_iter()
            .flat_map_iter(|i| scan_row(i, similarities, corpus, cfg))
            .collect()
    } else {
        (0..rows)
            .flat_map(|i| scan_row(i, similarities, corpus, cfg))
            .collect()
    }
}
