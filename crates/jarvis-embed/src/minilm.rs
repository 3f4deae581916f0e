use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tokenizers::Tokenizer;

use jarvis_core::traits::check_dimension;
use jarvis_core::types::EmbeddingVector;
use jarvis_core::{Embedder, Error, Result};

use crate::model_error;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_on_device;

/// Sentence embedder for `all-MiniLM-L6-v2` (BERT, mean pooled, 384-d).
pub struct MiniLmEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
}

impl MiniLmEmbedder {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        tracing::info!(dir = %model_dir.display(), "loading sentence-transformer");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            Error::ModelUnavailable(format!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))
        })?;

        let config_path = model_dir.join("config.json");
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| Error::ModelUnavailable(format!("Failed to read {}: {}", config_path.display(), e)))?;
        let config: BertConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::ModelUnavailable(format!("Invalid model config {}: {}", config_path.display(), e)))?;

        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = BertModel::load(vb, &config).map_err(model_error)?;
        tracing::info!(dim = config.hidden_size, "sentence-transformer loaded");

        Ok(Self { model, tokenizer, device, dim: config.hidden_size, max_len })
    }

    fn embed_text(&self, text: &str) -> Result<EmbeddingVector> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like().map_err(model_error)?;
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(model_error)?;
        let pooled = masked_mean_l2(&hidden, &attention_mask).map_err(model_error)?;
        let vector: Vec<f32> = pooled
            .to_device(&Device::Cpu)
            .and_then(|t| t.squeeze(0))
            .and_then(|t| t.to_vec1())
            .map_err(model_error)?;
        check_dimension(self.dim, vector.len())?;
        if start.elapsed().as_millis() > 100 {
            tracing::debug!(ms = start.elapsed().as_millis() as u64, "slow embedding");
        }
        Ok(vector)
    }
}

impl Embedder for MiniLmEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn embed_many(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        texts.iter().map(|t| self.embed_text(t)).collect()
    }
}

fn select_device() -> Device {
    #[cfg(feature = "metal")]
    match Device::new_metal(0) {
        Ok(dev) => {
            tracing::info!(device = "metal", "embedding device selected");
            return dev;
        }
        Err(e) => tracing::warn!(error = %e, "Metal unavailable, embedding on CPU"),
    }
    tracing::info!(device = "cpu", "embedding device selected");
    Device::Cpu
}

/// Prefers `model.safetensors`, falls back to the PyTorch pickle.
fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return candle_core::safetensors::load(&safetensors, device).map_err(model_error);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        let weights = candle_core::pickle::read_all(&pickle).map_err(model_error)?;
        return Ok(weights.into_iter().collect());
    }
    Err(Error::ModelUnavailable(format!("no model.safetensors or pytorch_model.bin in {}", model_dir.display())))
}
