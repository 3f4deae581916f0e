use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use jarvis_core::types::EmbeddingVector;
use jarvis_core::{Embedder, Result};

/// Bag-of-tokens embedder: each whitespace token is hashed into a bucket.
/// Deterministic across runs and processes; texts sharing words score higher.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn embed_text(&self, text: &str) -> EmbeddingVector {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let token = token.to_lowercase();
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn embed_many(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_zero_vector() {
        let v = HashEmbedder::new(8).embed_text("   ");
        assert_eq!(v, vec![0.0; 8]);
    }

    #[test]
    fn case_does_not_change_the_vector() {
        let e = HashEmbedder::new(64);
        assert_eq!(e.embed_text("Solar Panels"), e.embed_text("solar panels"));
    }
}
