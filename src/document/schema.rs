use std::path::{Path, PathBuf};
use uuid::Uuid;

/// An uploaded document persisted for the lifetime of one request.
///
/// The backing file is removed when the value is dropped, so a request that
/// is cancelled or times out never leaves its upload behind. Explicit release
/// through [`DocumentStore::release`](super::DocumentStore::release) is still
/// the normal path.
#[derive(Debug)]
pub struct StoredDocument {
    id: Uuid,
    path: PathBuf,
    size: u64,
}

impl StoredDocument {
    pub(crate) fn new(id: Uuid, path: PathBuf, size: u64) -> Self {
        Self { id, path, size }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for StoredDocument {
    fn drop(&mut self) {
        // Already gone after a normal release.
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Plain text pulled out of a PDF, page by page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedText {
    pages: Vec<String>,
    text: String,
}

impl ExtractedText {
    /// Trim every page, join them with newlines and trim the result.
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pages: Vec<String> = pages
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .collect();
        let text = pages.join("\n").trim().to_string();
        Self { pages, text }
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
