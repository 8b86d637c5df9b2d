//! Workspace umbrella crate for samemail.
//!
//! This crate stitches the three stages together so callers can go from a
//! list of document ids to suspicion ratings with a single call:
//!
//! 1. `ingest` fetches every id from a [`DocumentProvider`] and pins the
//!    documents into a [`Corpus`].
//! 2. `perceptual` shingles each content, signs it with one shared MinHash
//!    family and estimates every pairwise similarity.
//! 3. `rating` turns the estimates into per-document ratings.
//!
//! ```
//! use samemail::{calculate_ratings, Document, MemoryProvider, SamemailConfig};
//!
//! let provider: MemoryProvider = [
//!     Document::new("a", "claim your prize now by replying to this mail").with_sender("x@spam"),
//!     Document::new("b", "claim your prize now by replying to this mail").with_sender("x@spam"),
//!     Document::new("c", "the meeting moved to thursday afternoon"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let mut cfg = SamemailConfig::default();
//! cfg.perceptual.seed = Some(7);
//!
//! let report = calculate_ratings(&["a", "b", "c"], &provider, &cfg).unwrap();
//! assert_eq!(report.rating("a"), Some(1.0 * 2.0 + 0.1));
//! assert_eq!(report.rating("c"), Some(0.0));
//! ```

pub mod config;

pub use crate::config::{ConfigLoadError, SamemailConfig};
pub use ingest::{
    Corpus, Document, DocumentProvider, IngestError, MailDirectory, MemoryProvider,
    parse_line_corpus, parse_mail,
};
pub use perceptual::{
    CorpusFingerprint, PerceptualConfig, PerceptualError, ShingleConfig, SimilarityMatrix,
    TailPolicy, calculate_similarities, generate_signatures, make_shingles,
};
pub use rating::{
    DocumentRating, RatingConfig, RatingError, RatingReport, SuspiciousPair, ThresholdComparison,
    aggregate_ratings,
};

use std::time::Instant;

use rand::Rng;
use thiserror::Error;
use tracing::{info, info_span, warn};

/// Errors that can occur while rating a batch of documents.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("ingest failure: {0}")]
    Ingest(#[from] IngestError),

    #[error("perceptual fingerprinting failed: {0}")]
    Perceptual(#[from] PerceptualError),

    #[error("rating failure: {0}")]
    Rating(#[from] RatingError),
}

/// Everything a rating run produced, for callers that want more than the
/// ratings themselves.
#[derive(Debug, Clone)]
pub struct RatingRun {
    pub corpus: Corpus,
    pub fingerprint: CorpusFingerprint,
    pub similarities: SimilarityMatrix,
    pub report: RatingReport,
}

impl RatingRun {
    /// One line per pair, `"<id> & <id>: <similarity>"`, with a trailing `!`
    /// on pairs that crossed the threshold.
    pub fn pair_lines(&self, cfg: &RatingConfig) -> Vec<String> {
        let docs = self.corpus.documents();
        self.similarities
            .pairs()
            .map(|(i, j, similarity)| {
                let mark = if cfg.comparison.passes(similarity, cfg.threshold) {
                    " !"
                } else {
                    ""
                };
                format!("{} & {}: {similarity:.2}{mark}", docs[i].id, docs[j].id)
            })
            .collect()
    }
}

/// Fetch `ids` from `provider` and rate them.
pub fn calculate_ratings<P, S>(
    ids: &[S],
    provider: &P,
    cfg: &SamemailConfig,
) -> Result<RatingReport, PipelineError>
where
    P: DocumentProvider + ?Sized,
    S: AsRef<str>,
{
    calculate_ratings_with_matrix(ids, provider, cfg).map(|run| run.report)
}

/// Like [`calculate_ratings`], but keeps the corpus, signatures and
/// similarity matrix around for diagnostics.
pub fn calculate_ratings_with_matrix<P, S>(
    ids: &[S],
    provider: &P,
    cfg: &SamemailConfig,
) -> Result<RatingRun, PipelineError>
where
    P: DocumentProvider + ?Sized,
    S: AsRef<str>,
{
    let mut rng = cfg.perceptual.rng();
    run_pipeline(
        ids.len(),
        || Corpus::load(ids, provider).map_err(PipelineError::from),
        cfg,
        &mut rng,
    )
}

/// Rate an already loaded corpus, drawing the hash family from the
/// configured seed.
pub fn rate_corpus(corpus: Corpus, cfg: &SamemailConfig) -> Result<RatingRun, PipelineError> {
    let mut rng = cfg.perceptual.rng();
    rate_corpus_with_rng(corpus, cfg, &mut rng)
}

/// Rate an already loaded corpus with an explicit random source.
pub fn rate_corpus_with_rng<R: Rng>(
    corpus: Corpus,
    cfg: &SamemailConfig,
    rng: &mut R,
) -> Result<RatingRun, PipelineError> {
    run_pipeline(corpus.len(), || Ok(corpus), cfg, rng)
}

/// Every entry point funnels through here so each run gets one
/// `samemail.calculate_ratings` span, loading included.
fn run_pipeline<F, R>(
    documents: usize,
    load: F,
    cfg: &SamemailConfig,
    rng: &mut R,
) -> Result<RatingRun, PipelineError>
where
    F: FnOnce() -> Result<Corpus, PipelineError>,
    R: Rng,
{
    let span = info_span!("samemail.calculate_ratings", documents);
    let _guard = span.enter();

    let start = Instant::now();
    let result = load().and_then(|corpus| run_stages(corpus, cfg, rng));
    let elapsed_micros = start.elapsed().as_micros();

    match &result {
        Ok(run) => info!(
            documents = run.corpus.len(),
            suspicious_pairs = run.report.suspicious_pairs.len(),
            average_rating = ?run.report.average_rating,
            elapsed_micros,
            "pipeline_success"
        ),
        Err(err) => warn!(error = %err, elapsed_micros, "pipeline_failure"),
    }
    result
}

fn run_stages<R: Rng>(
    corpus: Corpus,
    cfg: &SamemailConfig,
    rng: &mut R,
) -> Result<RatingRun, PipelineError> {
    let contents: Vec<&str> = corpus.iter().map(|doc| doc.content.as_str()).collect();
    let fingerprint = perceptual::fingerprint_corpus_with_rng(&contents, &cfg.perceptual, rng)?;
    let similarities = perceptual::calculate_similarities_with(
        &fingerprint.signatures,
        cfg.perceptual.use_parallel,
    )?;
    let report = aggregate_ratings(&similarities, &corpus, &cfg.rating)?;

    Ok(RatingRun {
        corpus,
        fingerprint,
        similarities,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use tracing::span::{Attributes, Id};
    use tracing::Subscriber;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::{Layer, Registry};

    /// Records the name of every span opened while it is installed.
    #[derive(Clone, Default)]
    struct SpanNames(Arc<Mutex<Vec<&'static str>>>);

    impl<S: Subscriber> Layer<S> for SpanNames {
        fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
            self.0.lock().unwrap().push(attrs.metadata().name());
        }
    }

    fn spans_opened_by(run: impl FnOnce()) -> Vec<&'static str> {
        let names = SpanNames::default();
        let subscriber = Registry::default().with(names.clone());
        tracing::subscriber::with_default(subscriber, run);
        let opened = names.0.lock().unwrap().clone();
        opened
    }

    fn provider() -> MemoryProvider {
        [
            Document::new("m1", "one two three four five six").with_sender("s@x"),
            Document::new("m2", "one two three four five six").with_sender("s@x"),
            Document::new("m3", "entirely different words live here"),
        ]
        .into_iter()
        .collect()
    }

    fn seeded() -> SamemailConfig {
        SamemailConfig::default().with_perceptual(PerceptualConfig::default().with_seed(1))
    }

    #[test]
    fn identical_same_sender_pair_gets_full_score() {
        let report = calculate_ratings(&["m1", "m2", "m3"], &provider(), &seeded()).unwrap();
        assert_eq!(report.rating("m1"), Some(2.1));
        assert_eq!(report.rating("m2"), Some(2.1));
        assert_eq!(report.rating("m3"), Some(0.0));
        assert_eq!(report.suspicious_pairs.len(), 1);
    }

    #[test]
    fn ratings_follow_requested_order() {
        let report = calculate_ratings(&["m3", "m1"], &provider(), &seeded()).unwrap();
        let ids: Vec<_> = report.ratings.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["m3", "m1"]);
    }

    #[test]
    fn missing_id_is_an_ingest_error() {
        let err = calculate_ratings(&["m1", "nope"], &provider(), &seeded()).unwrap_err();
        assert_eq!(
            err,
            PipelineError::Ingest(IngestError::NotFound("nope".to_string()))
        );
    }

    #[test]
    fn invalid_perceptual_config_is_reported() {
        let cfg = seeded().with_perceptual(PerceptualConfig::default().with_num_hashes(0));
        let err = calculate_ratings(&["m1", "m2"], &provider(), &cfg).unwrap_err();
        assert!(matches!(err, PipelineError::Perceptual(_)));
    }

    // ==================== Tracing ====================

    #[test]
    fn every_entry_point_opens_the_run_span() {
        let from_ids = spans_opened_by(|| {
            calculate_ratings(&["m1", "m2"], &provider(), &seeded()).unwrap();
        });
        assert_eq!(from_ids, vec!["samemail.calculate_ratings"]);

        let corpus = Corpus::from_documents([Document::new("x", "a b c d")]).unwrap();
        let from_corpus = spans_opened_by(|| {
            rate_corpus(corpus, &seeded()).unwrap();
        });
        assert_eq!(from_corpus, vec!["samemail.calculate_ratings"]);
    }

    #[test]
    fn failed_load_still_runs_inside_the_span() {
        let opened = spans_opened_by(|| {
            calculate_ratings(&["missing"], &provider(), &seeded()).unwrap_err();
        });
        assert_eq!(opened, vec!["samemail.calculate_ratings"]);
    }

    #[test]
    fn pair_lines_mark_suspicious_pairs() {
        let cfg = seeded();
        let run = calculate_ratings_with_matrix(&["m1", "m2", "m3"], &provider(), &cfg).unwrap();
        let lines = run.pair_lines(&cfg.rating);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "m1 & m2: 1.00 !");
        assert!(lines[1].starts_with("m1 & m3: "));
        assert!(!lines[1].ends_with('!'));
    }
}
