use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use jarvis_core::prompt;
use jarvis_core::traits::check_dimension;
use jarvis_core::types::{ChatRequest, ChatResponse, IndexEntry, IngestReport, RetrievalMatch};
use jarvis_core::{Chunker, Embedder, Error, Generator, Result, VectorIndex};

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_EMBED_BATCH: usize = 32;

/// Chunk, embed, index, retrieve, prompt and generate over one knowledge base.
pub struct RagPipeline<VI, G>
where
    VI: VectorIndex,
    G: Generator,
{
    embedder: Box<dyn Embedder>,
    index: VI,
    generator: G,
    chunker: Chunker,
    embed_batch_size: usize,
    top_k: usize,
    show_progress: bool,
}

impl<VI, G> RagPipeline<VI, G>
where
    VI: VectorIndex,
    G: Generator,
{
    pub fn new(embedder: Box<dyn Embedder>, index: VI, generator: G, chunker: Chunker) -> Self {
        Self {
            embedder,
            index,
            generator,
            chunker,
            embed_batch_size: DEFAULT_EMBED_BATCH,
            top_k: DEFAULT_TOP_K,
            show_progress: false,
        }
    }

    pub fn with_embed_batch_size(mut self, n: usize) -> Self {
        self.embed_batch_size = n.max(1);
        self
    }

    /// Number of matches used by `chat`.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn index(&self) -> &VI { &self.index }
    pub fn generator(&self) -> &G { &self.generator }
    pub fn embedder(&self) -> &dyn Embedder { self.embedder.as_ref() }
    pub fn chunker(&self) -> &Chunker { &self.chunker }
    pub fn top_k(&self) -> usize { self.top_k }

    /// Creates the index for the embedder's dimension if it does not exist yet.
    pub fn prepare(&self) -> Result<()> {
        self.index.ensure_index(self.embedder.dim())
    }

    pub fn ingest_file(&self, path: impl AsRef<Path>) -> Result<IngestReport> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "ingesting knowledge document");
        read_document(path)
            .and_then(|text| self.ingest_text(&text))
            .map_err(|e| Error::ingest(path, e))
    }

    pub fn ingest_text(&self, text: &str) -> Result<IngestReport> {
        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            tracing::info!("document is empty, nothing to index");
            return Ok(IngestReport::default());
        }
        let dim = self.embedder.dim();

        let pb = if self.show_progress { ProgressBar::new(chunks.len() as u64) } else { ProgressBar::hidden() };
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb.set_message("embedding");

        let mut entries = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.embed_batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed_many(&texts)?;
            if vectors.len() != batch.len() {
                return Err(Error::ModelUnavailable(format!(
                    "embedder returned {} vectors for {} texts",
                    vectors.len(),
                    batch.len()
                )));
            }
            for (chunk, vector) in batch.iter().zip(vectors) {
                check_dimension(dim, vector.len())?;
                entries.push(IndexEntry::from_chunk(chunk, vector));
            }
            pb.inc(batch.len() as u64);
        }

        pb.set_message("upserting");
        self.index.upsert(&entries)?;
        pb.finish_with_message("indexed");
        tracing::info!(chunks = entries.len(), "knowledge document indexed");
        Ok(IngestReport { chunks: entries.len() })
    }

    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievalMatch>> {
        let vector = self.embedder.embed_one(query)?;
        let matches = self.index.query(&vector, top_k)?;
        tracing::debug!(top_k, matches = matches.len(), "retrieved");
        Ok(matches)
    }

    pub fn retrieve_context(&self, query: &str, top_k: usize) -> Result<String> {
        Ok(prompt::join_context(&self.retrieve(query, top_k)?))
    }

    pub fn build_prompt(&self, query: &str, top_k: usize) -> Result<String> {
        let context = self.retrieve_context(query, top_k)?;
        Ok(prompt::build_prompt(&context, query))
    }

    /// Errors only come from embedding or retrieval; generation failures arrive as text.
    pub fn answer(&self, query: &str, top_k: usize) -> Result<String> {
        let prompt = self.build_prompt(query, top_k)?;
        Ok(self.generator.generate(&prompt))
    }

    pub fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let answer = self.answer(&request.query, self.top_k)?;
        Ok(ChatResponse { answer })
    }

    /// Drops every indexed chunk by recreating the index.
    pub fn reset(&self) -> Result<()> {
        tracing::info!("resetting vector index");
        self.index.delete_index()?;
        self.prepare()
    }
}

/// Invalid UTF-8 is an `Io` error of kind `InvalidData`.
fn read_document(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}
