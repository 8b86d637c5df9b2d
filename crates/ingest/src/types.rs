//! Document record type shared by every pipeline stage.
//!
//! ```text
//! Document
//! ├── id: String              unique within a corpus
//! ├── sender: Option<String>  used by the rating multiplier
//! ├── topic: Option<String>   carried for reporting only
//! └── content: String         the text that gets shingled
//! ```
use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// A single document (typically one email) as read from a provider.
///
/// Documents are immutable once read; the corpus only ever hands out shared
/// references to them.
///
/// # Examples
///
/// ```rust
/// use ingest::Document;
///
/// let doc = Document::new("mail-1", "Buy cheap watches now")
///     .with_sender("promo@example.com");
/// assert_eq!(doc.sender.as_deref(), Some("promo@example.com"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    pub content: String,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sender: None,
            topic: None,
            content: content.into(),
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Check the record-level invariants that do not depend on other documents.
    ///
    /// Uniqueness of the id is checked by [`Corpus`](crate::Corpus), which
    /// sees the whole batch.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.id.trim().is_empty() {
            return Err(IngestError::invalid(&self.id, "id must not be empty"));
        }
        Ok(())
    }

    /// Returns `true` when both documents carry a sender and the senders match.
    ///
    /// Documents without a sender never count as sharing one.
    pub fn same_sender(&self, other: &Document) -> bool {
        match (self.sender.as_deref(), other.sender.as_deref()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
