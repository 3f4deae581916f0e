//! Text embedders behind `jarvis_core::Embedder`.
//!
//! `MiniLmEmbedder` runs all-MiniLM-L6-v2 locally on candle. `HashEmbedder` is a
//! deterministic stand-in for tests and offline runs; `APP_USE_FAKE_EMBEDDINGS=1`
//! forces it regardless of configuration.
use std::path::{Path, PathBuf};

use jarvis_core::config::{EmbedderBackend, EmbedderSettings};
use jarvis_core::traits::check_dimension;
use jarvis_core::{Embedder, Error, Result};

pub mod hash;
pub mod minilm;
pub mod pool;
pub mod tokenize;

pub use hash::HashEmbedder;
pub use minilm::MiniLmEmbedder;
pub use pool::masked_mean_l2;

pub const MODEL_DIR_NAME: &str = "all-MiniLM-L6-v2";

pub(crate) fn model_error(e: candle_core::Error) -> Error {
    Error::ModelUnavailable(e.to_string())
}

pub fn get_default_embedder(settings: &EmbedderSettings) -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake || settings.backend == EmbedderBackend::Hash {
        tracing::info!(dim = settings.dimension, "using hash embedder");
        return Ok(Box::new(HashEmbedder::new(settings.dimension)));
    }
    let model_dir = resolve_model_dir(settings.model_dir.as_deref())?;
    let embedder = MiniLmEmbedder::load(&model_dir, settings.max_len)?;
    check_dimension(settings.dimension, embedder.dim())?;
    Ok(Box::new(embedder))
}

fn resolve_model_dir(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = configured {
        let p = jarvis_core::config::expand_path(dir);
        if p.exists() { return Ok(p); }
        return Err(Error::ModelUnavailable(format!("configured model dir {} does not exist", p.display())));
    }
    if let Ok(dir) = std::env::var("APP_MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() { tracing::info!(dir = %p.display(), "using APP_MODEL_DIR"); return Ok(p); }
    }
    for candidate in [Path::new("models").join(MODEL_DIR_NAME), Path::new("../models").join(MODEL_DIR_NAME)] {
        if candidate.exists() { return Ok(candidate); }
    }
    Err(Error::ModelUnavailable(format!("Could not locate {} model directory", MODEL_DIR_NAME)))
}
