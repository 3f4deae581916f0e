//! Startup wiring from `Settings` to a ready pipeline.
use std::path::Path;

use jarvis_core::config::Settings;
use jarvis_core::{Chunker, Result};
use jarvis_embed::get_default_embedder;
use jarvis_llm::LlmGenerator;
use jarvis_vector::IndexBackend;

use crate::pipeline::RagPipeline;

pub type DefaultPipeline = RagPipeline<IndexBackend, LlmGenerator>;

/// Builds the components and ensures the index exists. Nothing is ingested.
pub fn build_pipeline(settings: &Settings) -> Result<DefaultPipeline> {
    settings.validate()?;
    let chunker = Chunker::new(settings.knowledge.chunking())?;
    let embedder = get_default_embedder(&settings.embedder)?;
    let index = IndexBackend::from_settings(&settings.index)?;
    let generator = LlmGenerator::from_settings(&settings.generator)?;

    let pipeline = RagPipeline::new(embedder, index, generator, chunker)
        .with_embed_batch_size(settings.knowledge.embed_batch_size)
        .with_top_k(settings.retrieval.top_k)
        .with_progress(settings.knowledge.show_progress);
    pipeline.prepare()?;
    Ok(pipeline)
}

/// `build_pipeline`, then ingest the configured knowledge file when enabled.
/// A failed ingestion is logged and the pipeline is served with whatever the index holds.
pub fn bootstrap(settings: &Settings) -> Result<DefaultPipeline> {
    let pipeline = build_pipeline(settings)?;
    if settings.knowledge.ingest_on_startup {
        let path = jarvis_core::config::expand_path(&settings.knowledge.path);
        ingest_or_log(&pipeline, &path);
    }
    Ok(pipeline)
}

fn ingest_or_log(pipeline: &DefaultPipeline, path: &Path) {
    match pipeline.ingest_file(path) {
        Ok(report) => tracing::info!(chunks = report.chunks, "startup ingestion complete"),
        Err(e) => tracing::error!(error = %e, "startup ingestion failed, serving with an incomplete index"),
    }
}
