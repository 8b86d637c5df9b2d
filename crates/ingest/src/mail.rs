//! Plain-text mail formats and the directory-backed provider.
//!
//! Two layouts are understood:
//!
//! - **Mail file**: one document per file. The first line is a header line
//!   that is ignored, the second is the sender address, the third the topic,
//!   and everything after the third newline is the content.
//! - **Line corpus**: one document per line, `<id> <content>`, split at the
//!   first space. There is no sender.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::IngestError;
use crate::provider::DocumentProvider;
use crate::types::Document;

/// Parse a single mail file body into a [`Document`].
///
/// ```rust
/// use ingest::parse_mail;
///
/// let doc = parse_mail("m1", "From x\nalice@example.com\nLunch\nsee you at noon").unwrap();
/// assert_eq!(doc.sender.as_deref(), Some("alice@example.com"));
/// assert_eq!(doc.topic.as_deref(), Some("Lunch"));
/// assert_eq!(doc.content, "see you at noon");
/// ```
pub fn parse_mail(id: &str, text: &str) -> Result<Document, IngestError> {
    let mut parts = text.splitn(4, '\n');
    let _header = parts.next();
    let (Some(sender), Some(topic), Some(content)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(IngestError::invalid(
            id,
            "expected header, sender and topic lines before content",
        ));
    };

    let doc = Document::new(id, content)
        .with_sender(sender.trim_end_matches('\r'))
        .with_topic(topic.trim_end_matches('\r'));
    doc.validate()?;
    Ok(doc)
}

/// Parse a line-per-document corpus.
///
/// Blank lines are skipped. A line without a space becomes a document with
/// empty content whose id is the whole line.
pub fn parse_line_corpus(text: &str) -> Result<Vec<Document>, IngestError> {
    let mut out = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (id, content) = line.split_once(' ').unwrap_or((line, ""));
        let doc = Document::new(id, content);
        doc.validate()?;
        out.push(doc);
    }
    Ok(out)
}

/// Provider that reads mail files from a directory; the file name is the id.
#[derive(Debug, Clone)]
pub struct MailDirectory {
    root: PathBuf,
}

impl MailDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File names of all regular files in the directory, sorted.
    ///
    /// Names that are not valid UTF-8 are skipped.
    pub fn ids(&self) -> Result<Vec<String>, IngestError> {
        let path = self.root.display().to_string();
        let entries = fs::read_dir(&self.root).map_err(|e| IngestError::io(&path, &e))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| IngestError::io(&path, &e))?;
            let file_type = entry.file_type().map_err(|e| IngestError::io(&path, &e))?;
            if !file_type.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => ids.push(name),
                Err(name) => debug!(?name, "skipping non-utf8 file name"),
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }
}

impl DocumentProvider for MailDirectory {
    fn fetch(&self, id: &str) -> Result<Document, IngestError> {
        let path = self.root.join(id);
        let bytes = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IngestError::NotFound(id.to_string())
            } else {
                IngestError::io(path.display().to_string(), &e)
            }
        })?;
        let text = String::from_utf8(bytes)
            .map_err(|e| IngestError::invalid(id, format!("content is not valid UTF-8: {e}")))?;
        parse_mail(id, &text)
    }
}
