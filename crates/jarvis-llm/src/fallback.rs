use jarvis_core::Generator;

/// Characters of the prompt echoed back in fallback mode.
pub const ECHO_CHARS: usize = 50;
pub const FALLBACK_MARKER: &str = "fallback mode";

pub fn fallback_response(prompt: &str) -> String {
    let head: String = prompt.chars().take(ECHO_CHARS).collect();
    format!(
        "I received your query: '{head}...' and would normally process this with the LLM, \
         but I'm currently running in {FALLBACK_MARKER} due to resource constraints."
    )
}

/// Answers without any backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackGenerator;

impl Generator for FallbackGenerator {
    fn generate(&self, prompt: &str) -> String {
        tracing::debug!(prompt_chars = prompt.chars().count(), "fallback response");
        fallback_response(prompt)
    }
}
