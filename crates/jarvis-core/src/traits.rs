use crate::error::{Error, Result};
use crate::types::{EmbeddingVector, IndexEntry, RetrievalMatch};

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    /// Order-preserving; the output has one vector per input text.
    fn embed_many(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>>;

    fn embed_one(&self, text: &str) -> Result<EmbeddingVector> {
        self.embed_many(&[text.to_string()])?
            .pop()
            .ok_or_else(|| Error::ModelUnavailable("embedder returned no vector".into()))
    }
}

pub trait VectorIndex: Send + Sync {
    /// Create-if-absent, configured for cosine similarity. Safe to call on every startup.
    fn ensure_index(&self, dimension: usize) -> Result<()>;
    fn upsert(&self, entries: &[IndexEntry]) -> Result<()>;
    /// Descending by score, at most `top_k` long. An empty index yields an empty list.
    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievalMatch>>;
    /// No-op when the index does not exist.
    fn delete_index(&self) -> Result<()>;
}

/// Completion backend. Failures are reported as text, never as errors.
pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str) -> String;
}

impl<T: Embedder + ?Sized> Embedder for Box<T> {
    fn dim(&self) -> usize { (**self).dim() }
    fn embed_many(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> { (**self).embed_many(texts) }
    fn embed_one(&self, text: &str) -> Result<EmbeddingVector> { (**self).embed_one(text) }
}

impl<T: VectorIndex + ?Sized> VectorIndex for std::sync::Arc<T> {
    fn ensure_index(&self, dimension: usize) -> Result<()> { (**self).ensure_index(dimension) }
    fn upsert(&self, entries: &[IndexEntry]) -> Result<()> { (**self).upsert(entries) }
    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievalMatch>> { (**self).query(vector, top_k) }
    fn delete_index(&self) -> Result<()> { (**self).delete_index() }
}

impl<T: Generator + ?Sized> Generator for std::sync::Arc<T> {
    fn generate(&self, prompt: &str) -> String { (**self).generate(prompt) }
}

/// Vectors are never truncated or padded to fit.
pub fn check_dimension(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::Configuration(format!("vector dimension mismatch: expected {expected}, got {actual}")))
    }
}
