use crate::error::{AnalyzerError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use super::schema::StoredDocument;

/// Manages request-scoped uploads under a single working directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    base_dir: PathBuf,
}

impl DocumentStore {
    pub fn new(base_dir: &str) -> Self {
        let expanded = shellexpand::tilde(base_dir).to_string();
        Self {
            base_dir: PathBuf::from(expanded),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Persist upload bytes under a fresh, never reused file name.
    pub async fn store(&self, data: &[u8]) -> Result<StoredDocument> {
        fs::create_dir_all(&self.base_dir).await.map_err(|e| {
            AnalyzerError::Storage(format!(
                "failed to create {}: {e}",
                self.base_dir.display()
            ))
        })?;

        let id = Uuid::new_v4();
        let path = self.base_dir.join(format!("financial_document_{id}.pdf"));

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                AnalyzerError::Storage(format!("failed to create {}: {e}", path.display()))
            })?;

        // From here on the guard owns the path and cleans up a partial write.
        let doc = StoredDocument::new(id, path, data.len() as u64);

        file.write_all(data).await.map_err(|e| {
            AnalyzerError::Storage(format!("failed to write {}: {e}", doc.path().display()))
        })?;
        file.flush().await.map_err(|e| {
            AnalyzerError::Storage(format!("failed to write {}: {e}", doc.path().display()))
        })?;

        debug!(id = %doc.id(), path = %doc.path().display(), bytes = doc.size(), "Stored upload");
        Ok(doc)
    }

    /// Remove the backing file. Safe to call more than once.
    pub async fn release(&self, doc: &StoredDocument) -> Result<()> {
        match fs::remove_file(doc.path()).await {
            Ok(()) => {
                debug!(id = %doc.id(), "Released upload");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AnalyzerError::Storage(format!(
                "failed to delete {}: {e}",
                doc.path().display()
            ))),
        }
    }
}
