//! Domain types shared by the chunker, embedders, vector indexes and the pipeline.

use serde::{Deserialize, Serialize};

pub type ChunkId = String;
pub type EmbeddingVector = Vec<f32>;

/// A window of the knowledge document.
///
/// - `id`: `chunk_<i>` where `i` is the emission index within the document
/// - `text`: never empty
/// - `source_offset`: character offset of the window start in the source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub source_offset: usize,
}

pub fn chunk_id(index: usize) -> ChunkId {
    format!("chunk_{index}")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(default)]
    pub text: String,
}

impl ChunkMetadata {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// What an index stores per chunk. Upserting an entry with an existing id replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: ChunkId,
    pub vector: EmbeddingVector,
    pub metadata: ChunkMetadata,
}

impl IndexEntry {
    pub fn from_chunk(chunk: &Chunk, vector: EmbeddingVector) -> Self {
        Self { id: chunk.id.clone(), vector, metadata: ChunkMetadata::new(chunk.text.clone()) }
    }
}

/// One ranked hit. Higher `score` is more similar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMatch {
    pub id: ChunkId,
    pub score: f32,
    #[serde(default)]
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub chunks: usize,
}
