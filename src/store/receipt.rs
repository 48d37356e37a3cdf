//! Local receipt access.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading the local receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("Failed to read receipt at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Source of the locally cached, platform-issued receipt blob.
#[async_trait]
pub trait ReceiptSource: Send + Sync + 'static {
    /// Returns the raw receipt bytes, or `None` when no receipt is cached.
    async fn load(&self) -> Result<Option<Vec<u8>>, ReceiptError>;
}

/// Reads the receipt from a file at a platform-defined path.
#[derive(Debug, Clone)]
pub struct FileReceiptSource {
    path: PathBuf,
}

impl FileReceiptSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReceiptSource for FileReceiptSource {
    async fn load(&self) -> Result<Option<Vec<u8>>, ReceiptError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                debug!(path = %self.path.display(), size = bytes.len(), "Receipt loaded");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ReceiptError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileReceiptSource::new(dir.path().join("receipt"));
        assert!(source.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt");
        std::fs::write(&path, b"receipt-bytes").unwrap();

        let source = FileReceiptSource::new(&path);
        assert_eq!(source.load().await.unwrap(), Some(b"receipt-bytes".to_vec()));
    }

    #[tokio::test]
    async fn test_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileReceiptSource::new(dir.path());
        assert!(matches!(source.load().await, Err(ReceiptError::Io { .. })));
    }
}
