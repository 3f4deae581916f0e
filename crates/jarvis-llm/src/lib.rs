//! Completion backends behind `jarvis_core::Generator`.
use jarvis_core::config::GenerationSettings;
use jarvis_core::{Generator, Result};

pub mod fallback;
pub mod ollama;

pub use fallback::{fallback_response, FallbackGenerator, FALLBACK_MARKER};
pub use ollama::{OllamaGenerator, GENERIC_FAILURE, RESOURCE_ADVISORY};

/// Live or fallback generation, chosen once from settings.
pub enum LlmGenerator {
    Live(OllamaGenerator),
    Fallback(FallbackGenerator),
}

impl LlmGenerator {
    pub fn from_settings(settings: &GenerationSettings) -> Result<Self> {
        if settings.fallback_mode {
            tracing::warn!("generator running in fallback mode, no LLM calls will be made");
            return Ok(Self::Fallback(FallbackGenerator));
        }
        Ok(Self::Live(OllamaGenerator::new(settings)?))
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// Fallback mode reports healthy without probing.
    pub fn health_check(&self) -> bool {
        match self {
            Self::Live(g) => g.health_check(),
            Self::Fallback(_) => true,
        }
    }
}

impl Generator for LlmGenerator {
    fn generate(&self, prompt: &str) -> String {
        match self {
            Self::Live(g) => g.generate(prompt),
            Self::Fallback(g) => g.generate(prompt),
        }
    }
}
