//! Validated, ordered document batch.
//!
//! A [`Corpus`] is the single place where document indices and ids meet.
//! Every later stage addresses documents by index (signature rows, matrix
//! cells); the corpus translates back to ids when ratings are reported.
use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, warn};

use crate::error::IngestError;
use crate::provider::DocumentProvider;
use crate::types::Document;

#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    index: HashMap<String, usize>,
}

impl Corpus {
    /// Build a corpus from documents in the given order.
    ///
    /// Fails on the first document with a blank id or an id already seen.
    pub fn from_documents<I>(documents: I) -> Result<Self, IngestError>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut corpus = Corpus::default();
        for doc in documents {
            corpus.push(doc)?;
        }
        Ok(corpus)
    }

    /// Fetch every id from `provider` and build a corpus in id order.
    pub fn load<P, S>(ids: &[S], provider: &P) -> Result<Self, IngestError>
    where
        P: DocumentProvider + ?Sized,
        S: AsRef<str>,
    {
        let start = Instant::now();
        let mut corpus = Corpus {
            documents: Vec::with_capacity(ids.len()),
            index: HashMap::with_capacity(ids.len()),
        };

        for id in ids {
            let id = id.as_ref();
            let result = provider.fetch(id).and_then(|doc| {
                if doc.id != id {
                    return Err(IngestError::invalid(
                        id,
                        format!("provider returned document with id {:?}", doc.id),
                    ));
                }
                corpus.push(doc)
            });
            if let Err(err) = result {
                warn!(id, error = %err, "corpus_load_failure");
                return Err(err);
            }
        }

        debug!(
            documents = corpus.len(),
            elapsed_micros = start.elapsed().as_micros(),
            "corpus_loaded"
        );
        Ok(corpus)
    }

    fn push(&mut self, doc: Document) -> Result<(), IngestError> {
        doc.validate()?;
        if self.index.contains_key(&doc.id) {
            return Err(IngestError::invalid(&doc.id, "duplicate id in corpus"));
        }
        self.index.insert(doc.id.clone(), self.documents.len());
        self.documents.push(doc);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Document> {
        self.documents.get(idx)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.documents.iter().map(|doc| doc.id.as_str())
    }

    /// Whether documents at `i` and `j` share a sender. Out-of-range indices
    /// never do.
    pub fn same_sender(&self, i: usize, j: usize) -> bool {
        match (self.documents.get(i), self.documents.get(j)) {
            (Some(a), Some(b)) => a.same_sender(b),
            _ => false,
        }
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}
