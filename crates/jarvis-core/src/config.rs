//! Layered configuration and path helpers.
//!
//! Figment merges compiled defaults, `config.toml`, `config.<env>.toml`, `APP_*`
//! env vars (nested with `__`) and the deployment variables `PINECONE_API_KEY`
//! and `JARVIS_FALLBACK_MODE`, in that order of precedence.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::ChunkingConfig;
use crate::error::{Error, Result};

pub const DEFAULT_INDEX_NAME: &str = "jarvis-knowledge-base";
/// Output width of all-MiniLM-L6-v2.
pub const DEFAULT_DIMENSION: usize = 384;

pub struct Config {
    figment: Figment,
    env_name: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(Some(&env_name))
    }

    pub fn load_for_env(env_name: Option<&str>) -> Result<Self> {
        let env_name = env_name.unwrap_or("dev").to_string();

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            other => tracing::warn!(env = other, "unknown RUST_ENV, only config.toml is used"),
        }
        figment = figment
            .merge(Env::prefixed("APP_").split("__"))
            .merge(Env::raw().only(&["PINECONE_API_KEY"]).map(|_| "index.api_key".into()));
        // only a case-insensitive "true" enables fallback; any other value, empty included, is false
        if let Ok(v) = env::var("JARVIS_FALLBACK_MODE") {
            figment = figment.merge(Serialized::default("generator.fallback_mode", v.eq_ignore_ascii_case("true")));
        }

        let config = Self { figment, env_name };
        config.validate_for_env()?;
        Ok(config)
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::Configuration(format!("Failed to get '{}': {}", key, e)))
    }

    /// Typed view of the whole configuration, validated.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::Configuration(format!("Failed to extract settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// The `[generator]` section alone, for commands that never touch the index or embedder.
    pub fn generation_settings(&self) -> Result<GenerationSettings> {
        self.get("generator")
    }

    fn validate_for_env(&self) -> Result<()> {
        if let "prod" | "production" = self.env_name.as_str() {
            let embedder: EmbedderBackend = self.get("embedder.backend")?;
            if embedder == EmbedderBackend::Hash {
                return Err(Error::Configuration("the hash embedder is not allowed in production".into()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub knowledge: KnowledgeSettings,
    pub retrieval: RetrievalSettings,
    pub embedder: EmbedderSettings,
    pub index: IndexSettings,
    pub generator: GenerationSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.knowledge.chunking().validate()?;
        if self.knowledge.embed_batch_size == 0 {
            return Err(Error::Configuration("knowledge.embed_batch_size must be greater than 0".into()));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Configuration("retrieval.top_k must be greater than 0".into()));
        }
        if self.embedder.dimension == 0 {
            return Err(Error::Configuration("embedder.dimension must be greater than 0".into()));
        }
        if self.index.backend == IndexBackendKind::Pinecone && self.index.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(Error::Configuration(
                "Pinecone API key is required. Set PINECONE_API_KEY environment variable.".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeSettings {
    pub path: String,
    pub chunk_size: usize,
    pub overlap: usize,
    pub embed_batch_size: usize,
    pub ingest_on_startup: bool,
    pub show_progress: bool,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        let chunking = ChunkingConfig::default();
        Self {
            path: "data/knowledge.txt".to_string(),
            chunk_size: chunking.chunk_size,
            overlap: chunking.overlap,
            embed_batch_size: 32,
            ingest_on_startup: true,
            show_progress: false,
        }
    }
}

impl KnowledgeSettings {
    pub fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig::new(self.chunk_size, self.overlap)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderBackend {
    MiniLm,
    Hash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderSettings {
    pub backend: EmbedderBackend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_dir: Option<String>,
    pub dimension: usize,
    pub max_len: usize,
}

impl Default for EmbedderSettings {
    fn default() -> Self {
        Self { backend: EmbedderBackend::MiniLm, model_dir: None, dimension: DEFAULT_DIMENSION, max_len: 256 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackendKind {
    Pinecone,
    Memory,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub backend: IndexBackendKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub controller_url: String,
    pub cloud: String,
    pub region: String,
    pub upsert_batch_size: usize,
    pub timeout_secs: u64,
    pub ready_timeout_secs: u64,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            backend: IndexBackendKind::Pinecone,
            name: DEFAULT_INDEX_NAME.to_string(),
            api_key: None,
            controller_url: "https://api.pinecone.io".to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            upsert_batch_size: 100,
            timeout_secs: 30,
            ready_timeout_secs: 60,
        }
    }
}

// Keeps the API key out of logs.
impl std::fmt::Debug for IndexSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexSettings")
            .field("backend", &self.backend)
            .field("name", &self.name)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("controller_url", &self.controller_url)
            .field("cloud", &self.cloud)
            .field("region", &self.region)
            .field("upsert_batch_size", &self.upsert_batch_size)
            .field("timeout_secs", &self.timeout_secs)
            .field("ready_timeout_secs", &self.ready_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub fallback_mode: bool,
    pub endpoint: String,
    pub model: String,
    pub num_ctx: u32,
    pub num_predict: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            fallback_mode: false,
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            num_ctx: 512,
            num_predict: 100,
            temperature: 0.7,
            top_p: 0.9,
            timeout_secs: 120,
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
