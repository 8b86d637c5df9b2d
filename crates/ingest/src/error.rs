//! Error types produced by the ingest crate.
//!
//! Parse and shape problems in document records are detected here, before any
//! shingling happens. Downstream stages assume every [`Document`](crate::Document)
//! they receive has a non-empty id that is unique within its corpus.
//!
//! # Error Categories
//!
//! | Error | Category | Description |
//! |-------|----------|-------------|
//! | [`InvalidDocument`](IngestError::InvalidDocument) | Validation | Empty or duplicate id, malformed record, non-UTF-8 content |
//! | [`NotFound`](IngestError::NotFound) | Lookup | Provider has no document for the requested id |
//! | [`Io`](IngestError::Io) | Storage | Reading a document source failed |
use thiserror::Error;

/// Errors that can occur while reading and validating documents.
///
/// All variants are cloneable and comparable so tests can match on them
/// precisely. I/O failures are flattened to strings for the same reason.
///
/// # Examples
///
/// ```rust
/// use ingest::IngestError;
///
/// let err = IngestError::NotFound("mail-7".to_string());
/// assert_eq!(err.to_string(), "document \"mail-7\" not found");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    /// The record cannot be used as a corpus document.
    ///
    /// Raised for empty ids, ids repeated within one corpus, records missing
    /// their header separators, and content that is not valid UTF-8.
    #[error("invalid document {id:?}: {reason}")]
    InvalidDocument { id: String, reason: String },

    /// The provider has no document under this id.
    #[error("document {0:?} not found")]
    NotFound(String),

    /// Reading from the backing store failed.
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}

impl IngestError {
    pub(crate) fn invalid(id: impl Into<String>, reason: impl Into<String>) -> Self {
        IngestError::InvalidDocument {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        IngestError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
