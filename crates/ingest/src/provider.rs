//! Document providers: the seam between storage and the similarity core.
use std::collections::HashMap;

use crate::error::IngestError;
use crate::types::Document;

/// Source of documents, looked up by id.
///
/// Closures of the shape `Fn(&str) -> Result<Document, IngestError>` are
/// providers, so ad-hoc lookups need no wrapper type.
pub trait DocumentProvider {
    fn fetch(&self, id: &str) -> Result<Document, IngestError>;
}

impl<F> DocumentProvider for F
where
    F: Fn(&str) -> Result<Document, IngestError>,
{
    fn fetch(&self, id: &str) -> Result<Document, IngestError> {
        self(id)
    }
}

/// Provider backed by an in-memory map from id to document.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    documents: HashMap<String, Document>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, replacing any previous one with the same id.
    pub fn insert(&mut self, doc: Document) {
        self.documents.insert(doc.id.clone(), doc);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Ids currently held, sorted for stable corpus order.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.documents.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }
}

impl FromIterator<Document> for MemoryProvider {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        let mut provider = MemoryProvider::new();
        for doc in iter {
            provider.insert(doc);
        }
        provider
    }
}

impl DocumentProvider for MemoryProvider {
    fn fetch(&self, id: &str) -> Result<Document, IngestError> {
        self.documents
            .get(id)
            .cloned()
            .ok_or_else(|| IngestError::NotFound(id.to_string()))
    }
}
