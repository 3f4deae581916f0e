//! Blocking client for Ollama's `/api/generate`.
//!
//! Every failure is turned into a user-facing sentence: callers of
//! `Generator::generate` always get text back.
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use jarvis_core::config::GenerationSettings;
use jarvis_core::{Error, Generator, Result};

pub const RESOURCE_ADVISORY: &str = "Sorry, the model requires more memory than available. Please close other applications and try again, or set JARVIS_FALLBACK_MODE=true to use fallback responses.";
pub const GENERIC_FAILURE: &str = "Sorry, I'm unable to generate a response right now.";

pub fn server_error(detail: &str) -> String {
    format!("Server error: {detail}")
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerateOptions {
    pub num_ctx: u32,
    pub num_predict: u32,
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct OllamaGenerator {
    client: Client,
    endpoint: String,
    model: String,
    options: GenerateOptions,
}

impl OllamaGenerator {
    pub fn new(settings: &GenerationSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        let endpoint = settings.endpoint.trim_end_matches('/').to_string();
        tracing::info!(endpoint = %endpoint, model = %settings.model, "Ollama generator configured");
        Ok(Self {
            client,
            endpoint,
            model: settings.model.clone(),
            options: GenerateOptions {
                num_ctx: settings.num_ctx,
                num_predict: settings.num_predict,
                temperature: settings.temperature,
                top_p: settings.top_p,
            },
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self) -> String {
        format!("{}/api/generate", self.endpoint)
    }

    /// Sends a trivial prompt with default decoding options; true on any 2xx.
    pub fn health_check(&self) -> bool {
        let body = GenerateRequest { model: &self.model, prompt: "Say hello", stream: false, options: None };
        match self.client.post(self.url()).json(&body).send() {
            Ok(resp) => {
                let ok = resp.status().is_success();
                if !ok {
                    tracing::warn!(status = %resp.status(), "Ollama health check failed");
                }
                ok
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ollama health check failed");
                false
            }
        }
    }
}

impl Generator for OllamaGenerator {
    fn generate(&self, prompt: &str) -> String {
        let start = Instant::now();
        let body = GenerateRequest { model: &self.model, prompt, stream: false, options: Some(self.options) };
        let resp = match self.client.post(self.url()).json(&body).send() {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "error communicating with Ollama");
                return GENERIC_FAILURE.to_string();
            }
        };

        let status = resp.status();
        if status.is_success() {
            return match resp.json::<GenerateResponse>() {
                Ok(parsed) => {
                    tracing::debug!(ms = start.elapsed().as_millis() as u64, chars = parsed.response.len(), "generated");
                    parsed.response
                }
                Err(e) => {
                    tracing::warn!(error = %e, "unreadable Ollama response");
                    GENERIC_FAILURE.to_string()
                }
            };
        }

        if status.is_server_error() {
            if let Ok(ErrorBody { error }) = resp.json::<ErrorBody>() {
                let lowered = error.to_lowercase();
                tracing::warn!(%status, error = %error, "Ollama server error");
                if lowered.contains("memory") || lowered.contains("available") {
                    return RESOURCE_ADVISORY.to_string();
                }
                return server_error(&error);
            }
        }
        tracing::warn!(%status, "HTTP error communicating with Ollama");
        GENERIC_FAILURE.to_string()
    }
}
