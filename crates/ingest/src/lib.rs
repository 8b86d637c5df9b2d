//! Samemail Ingest Layer
//!
//! This is where documents enter the pipeline. A provider hands us
//! `(id, sender, content)` records, we check them, and we pin them into a
//! [`Corpus`] whose order fixes the row/column indices every later stage uses.
//!
//! ## What we do here
//!
//! - **Validate records** - Ids must be non-empty and unique within a corpus.
//!   Content has to be UTF-8; the core never sees bytes.
//! - **Index documents** - [`Corpus`] is the one explicit index ↔ id mapping.
//!   Nothing downstream relies on map insertion order.
//! - **Read mail formats** - [`parse_mail`], [`parse_line_corpus`] and the
//!   [`MailDirectory`] provider cover the on-disk layouts we get mail in.
//!
//! ## Example
//!
//! ```
//! use ingest::{Corpus, Document, MemoryProvider};
//!
//! let provider: MemoryProvider = [
//!     Document::new("m1", "win a free cruise today").with_sender("a@example.com"),
//!     Document::new("m2", "win a free cruise tomorrow").with_sender("a@example.com"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let corpus = Corpus::load(&provider.ids(), &provider).unwrap();
//! assert_eq!(corpus.len(), 2);
//! assert!(corpus.same_sender(0, 1));
//! ```
mod corpus;
mod error;
mod mail;
mod provider;
mod types;

pub use crate::corpus::Corpus;
pub use crate::error::IngestError;
pub use crate::mail::{parse_line_corpus, parse_mail, MailDirectory};
pub use crate::provider::{DocumentProvider, MemoryProvider};
pub use crate::types::Document;
