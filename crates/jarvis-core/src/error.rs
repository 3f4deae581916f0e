use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing credentials, invalid chunking parameters, vector dimension mismatch.
    /// Fatal when raised during startup.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Vector index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Ingestion of {} failed: {source}", .path.display())]
    Ingest {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn ingest(path: impl Into<PathBuf>, source: Error) -> Self {
        Self::Ingest { path: path.into(), source: Box::new(source) }
    }

    /// True for failures that must stop the process at startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
