//! Fixed-size overlapping windows over a document.
//!
//! Sizes and offsets count Unicode scalar values, so a window never splits a
//! UTF-8 sequence. The window advances by `chunk_size - overlap`; emission order
//! defines the chunk ids (`chunk_0`, `chunk_1`, ...).
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{chunk_id, Chunk};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 500, overlap: 50 }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self { chunk_size, overlap }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Configuration("chunk_size must be greater than 0".into()));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::Configuration(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> ChunkingConfig {
        self.config
    }

    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        // byte offset of every char start, plus the end of the text
        let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let len = bounds.len() - 1;
        let window = |from: usize, to: usize| &text[bounds[from]..bounds[to]];

        let mut chunks = Vec::new();
        let mut start = 0usize;
        while start < len {
            let end = start + self.config.chunk_size;
            push_chunk(&mut chunks, window(start, end.min(len)), start);
            start += self.config.step();
            if start >= len {
                if end < len {
                    push_chunk(&mut chunks, window(end, len), end);
                }
                break;
            }
        }
        chunks
    }
}

fn push_chunk(chunks: &mut Vec<Chunk>, text: &str, source_offset: usize) {
    let id = chunk_id(chunks.len());
    chunks.push(Chunk { id, text: text.to_string(), source_offset });
}

/// One-shot form of [`Chunker::chunk`] that validates the parameters first.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    Ok(Chunker::new(ChunkingConfig::new(chunk_size, overlap))?.chunk(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn overlapping_windows_over_digits() {
        let chunks = chunk_text("0123456789", 5, 2).unwrap();
        assert_eq!(texts(&chunks), vec!["01234", "34567", "6789", "9"]);
        let offsets: Vec<usize> = chunks.iter().map(|c| c.source_offset).collect();
        assert_eq!(offsets, vec![0, 3, 6, 9]);
        let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["chunk_0", "chunk_1", "chunk_2", "chunk_3"]);
    }

    #[test]
    fn short_text_is_single_chunk() {
        let chunks = chunk_text("short text", 500, 50).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short text");
        assert_eq!(chunks[0].source_offset, 0);
    }

    #[test]
    fn zero_overlap_tiles() {
        let chunks = chunk_text("abcdefgh", 3, 0).unwrap();
        assert_eq!(texts(&chunks), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(chunk_text("", 10, 2).unwrap().is_empty());
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let chunks = chunk_text("héllo wörld ✓", 4, 1).unwrap();
        assert_eq!(texts(&chunks), vec!["héll", "lo w", "wörl", "ld ✓", "✓"]);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(chunk_text("abc", 0, 0), Err(Error::Configuration(_))));
        assert!(matches!(chunk_text("abc", 5, 5), Err(Error::Configuration(_))));
        assert!(matches!(chunk_text("abc", 5, 7), Err(Error::Configuration(_))));
    }
}
