//! Document source boundary.
//!
//! A [`DocumentSource`] yields raw document text by id. Absence of a
//! document is an ordinary condition at this boundary (`Ok(None)`), not an
//! error: a file may have been removed from storage after it was indexed,
//! and the search pipeline degrades per candidate instead of failing the
//! whole request.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Source of raw document text, keyed by doc_id.
pub trait DocumentSource: Send + Sync + std::fmt::Debug {
    /// Fetch the raw text for a document, or `None` if it does not exist.
    fn fetch(&self, doc_id: &str) -> Result<Option<String>>;

    /// List all available doc_ids, sorted ascending.
    ///
    /// Sorted output keeps downstream builds deterministic.
    fn list(&self) -> Result<Vec<String>>;
}

/// A directory of text files, one per document, filename = doc_id.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source over the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this source reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DocumentSource for DirectorySource {
    fn fetch(&self, doc_id: &str) -> Result<Option<String>> {
        let path = self.root.join(doc_id);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                log::warn!("skipping non-UTF-8 filename in {:?}", self.root);
                continue;
            };
            if name.ends_with(".txt") {
                ids.push(name.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}
