//! File-backed historical corpus.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pipeline::{HistoricalSource, HistoryError};

/// Reads the historical corpus from a local text file on every call.
#[derive(Debug, Clone)]
pub struct FileHistoricalSource {
    path: PathBuf,
}

impl FileHistoricalSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HistoricalSource for FileHistoricalSource {
    async fn load(&self) -> Result<Option<String>, HistoryError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(corpus) => {
                tracing::debug!(path = %self.path.display(), chars = corpus.chars().count(), "loaded historical data");
                Ok(Some(corpus))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no historical data file");
                Ok(None)
            }
            Err(err) => Err(HistoryError::Io {
                location: self.path.display().to_string(),
                message: err.to_string(),
            }),
        }
    }
}
