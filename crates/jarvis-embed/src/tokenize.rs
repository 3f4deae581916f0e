use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

use jarvis_core::{Error, Result};

/// Encodes `text` as a `[1, T]` id tensor and matching attention mask, `T <= max_len`.
pub fn tokenize_on_device(tokenizer: &Tokenizer, text: &str, max_len: usize, device: &Device) -> Result<(Tensor, Tensor)> {
    let enc = tokenizer
        .encode(text, true)
        .map_err(|e| Error::ModelUnavailable(format!("Tokenization failed: {}", e)))?;
    let mut ids = enc.get_ids().to_vec();
    let mut mask = enc.get_attention_mask().to_vec();
    if ids.len() > max_len { ids.truncate(max_len); mask.truncate(max_len); }
    let len = ids.len();
    let input_ids = Tensor::from_vec(ids, (1, len), device).map_err(crate::model_error)?;
    let attention_mask = Tensor::from_vec(mask, (1, len), device).map_err(crate::model_error)?;
    Ok((input_ids, attention_mask))
}
