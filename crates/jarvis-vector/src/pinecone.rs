//! Pinecone serverless index over the REST API.
//!
//! The control plane (`/indexes`) lives at the controller URL; upserts and
//! queries go to the per-index host reported by `describe`. The host and the
//! index dimension are cached after the first successful lookup.
use parking_lot::RwLock;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use jarvis_core::config::IndexSettings;
use jarvis_core::traits::check_dimension;
use jarvis_core::types::{ChunkMetadata, IndexEntry, RetrievalMatch};
use jarvis_core::{Error, Result, VectorIndex};

pub const API_VERSION: &str = "2025-01";

#[derive(Debug, Clone, Deserialize)]
pub struct IndexModel {
    pub name: String,
    #[serde(default)]
    pub dimension: Option<usize>,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub status: Option<IndexStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexModel>,
}

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: IndexSpec<'a>,
}

#[derive(Serialize)]
struct IndexSpec<'a> {
    serverless: Serverless<'a>,
}

#[derive(Serialize)]
struct Serverless<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<WireVector<'a>>,
}

#[derive(Serialize)]
struct WireVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a ChunkMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<RetrievalMatch>,
}

#[derive(Debug, Clone)]
struct IndexHandle {
    host: String,
    dimension: usize,
}

pub struct PineconeIndex {
    client: Client,
    api_key: String,
    controller_url: String,
    name: String,
    cloud: String,
    region: String,
    upsert_batch_size: usize,
    ready_timeout: Duration,
    poll_interval: Duration,
    handle: RwLock<Option<IndexHandle>>,
}

impl PineconeIndex {
    pub fn new(settings: &IndexSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Configuration("Pinecone API key is required. Set PINECONE_API_KEY environment variable.".into()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_key,
            controller_url: settings.controller_url.trim_end_matches('/').to_string(),
            name: settings.name.clone(),
            cloud: settings.cloud.clone(),
            region: settings.region.clone(),
            upsert_batch_size: settings.upsert_batch_size.max(1),
            ready_timeout: Duration::from_secs(settings.ready_timeout_secs),
            poll_interval: Duration::from_secs(1),
            handle: RwLock::new(None),
        })
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    fn control_url(&self, path: &str) -> String {
        format!("{}{}", self.controller_url, path)
    }

    pub fn list_indexes(&self) -> Result<Vec<IndexModel>> {
        let resp = send("list indexes", self.request(Method::GET, &self.control_url("/indexes")))?;
        if !resp.status().is_success() {
            return Err(status_error("list indexes", resp));
        }
        let list: IndexList = resp.json().map_err(|e| transport("list indexes", e))?;
        Ok(list.indexes)
    }

    pub fn describe(&self) -> Result<Option<IndexModel>> {
        let url = self.control_url(&format!("/indexes/{}", self.name));
        let resp = send("describe index", self.request(Method::GET, &url))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(status_error("describe index", resp));
        }
        resp.json().map(Some).map_err(|e| transport("describe index", e))
    }

    fn create(&self, dimension: usize) -> Result<()> {
        let body = CreateIndexRequest {
            name: &self.name,
            dimension,
            metric: "cosine",
            spec: IndexSpec { serverless: Serverless { cloud: &self.cloud, region: &self.region } },
        };
        let resp = send("create index", self.request(Method::POST, &self.control_url("/indexes")).json(&body))?;
        match resp.status() {
            s if s.is_success() => {
                tracing::info!(index = %self.name, dimension, "created Pinecone index");
                Ok(())
            }
            // created concurrently by another process
            StatusCode::CONFLICT => Ok(()),
            _ => Err(status_error("create index", resp)),
        }
    }

    fn wait_ready(&self) -> Result<IndexModel> {
        let deadline = Instant::now() + self.ready_timeout;
        loop {
            if let Some(model) = self.describe()? {
                if model.status.as_ref().map_or(false, |s| s.ready) && model.host.is_some() {
                    return Ok(model);
                }
            }
            if Instant::now() >= deadline {
                return Err(Error::IndexUnavailable(format!("index '{}' did not become ready in time", self.name)));
            }
            std::thread::sleep(self.poll_interval);
        }
    }

    fn cache_handle(&self, model: &IndexModel) -> Result<IndexHandle> {
        let host = model
            .host
            .clone()
            .ok_or_else(|| Error::IndexUnavailable(format!("index '{}' has no host yet", self.name)))?;
        let dimension = model
            .dimension
            .ok_or_else(|| Error::IndexUnavailable(format!("index '{}' reports no dimension", self.name)))?;
        let handle = IndexHandle { host, dimension };
        *self.handle.write() = Some(handle.clone());
        Ok(handle)
    }

    fn resolve(&self) -> Result<IndexHandle> {
        if let Some(h) = self.handle.read().clone() {
            return Ok(h);
        }
        let model = self
            .describe()?
            .ok_or_else(|| Error::IndexUnavailable(format!("index '{}' does not exist", self.name)))?;
        self.cache_handle(&model)
    }
}

impl VectorIndex for PineconeIndex {
    fn ensure_index(&self, dimension: usize) -> Result<()> {
        let existing = self.list_indexes()?.into_iter().find(|m| m.name == self.name);
        match existing {
            Some(model) => {
                if let Some(existing_dim) = model.dimension {
                    check_dimension(existing_dim, dimension)?;
                }
                if let Some(metric) = model.metric.as_deref().filter(|m| *m != "cosine") {
                    tracing::warn!(index = %self.name, metric, "existing index does not use cosine similarity");
                }
            }
            None => self.create(dimension)?,
        }
        let model = self.wait_ready()?;
        let handle = self.cache_handle(&model)?;
        check_dimension(handle.dimension, dimension)
    }

    fn upsert(&self, entries: &[IndexEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let handle = self.resolve()?;
        for e in entries {
            check_dimension(handle.dimension, e.vector.len())?;
        }
        let url = data_url(&handle.host, "/vectors/upsert");
        for batch in entries.chunks(self.upsert_batch_size) {
            let body = UpsertRequest {
                vectors: batch
                    .iter()
                    .map(|e| WireVector { id: &e.id, values: &e.vector, metadata: &e.metadata })
                    .collect(),
            };
            let resp = send("upsert", self.request(Method::POST, &url).json(&body))?;
            if !resp.status().is_success() {
                return Err(status_error("upsert", resp));
            }
        }
        tracing::debug!(index = %self.name, upserted = entries.len(), "upsert");
        Ok(())
    }

    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievalMatch>> {
        let handle = self.resolve()?;
        check_dimension(handle.dimension, vector.len())?;
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let body = QueryRequest { vector, top_k, include_metadata: true, include_values: false };
        let resp = send("query", self.request(Method::POST, &data_url(&handle.host, "/query")).json(&body))?;
        if !resp.status().is_success() {
            return Err(status_error("query", resp));
        }
        let parsed: QueryResponse = resp.json().map_err(|e| transport("query", e))?;
        let mut matches = parsed.matches;
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(top_k);
        Ok(matches)
    }

    fn delete_index(&self) -> Result<()> {
        *self.handle.write() = None;
        if !self.list_indexes()?.iter().any(|m| m.name == self.name) {
            return Ok(());
        }
        let url = self.control_url(&format!("/indexes/{}", self.name));
        let resp = send("delete index", self.request(Method::DELETE, &url))?;
        if resp.status().is_success() || resp.status() == StatusCode::NOT_FOUND {
            tracing::info!(index = %self.name, "deleted Pinecone index");
            return Ok(());
        }
        Err(status_error("delete index", resp))
    }
}

fn data_url(host: &str, path: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}{}", host.trim_end_matches('/'), path)
    } else {
        format!("https://{}{}", host.trim_end_matches('/'), path)
    }
}

fn send(op: &str, req: RequestBuilder) -> Result<Response> {
    req.send().map_err(|e| transport(op, e))
}

fn transport(op: &str, e: reqwest::Error) -> Error {
    Error::IndexUnavailable(format!("{} failed: {}", op, e))
}

fn status_error(op: &str, resp: Response) -> Error {
    let status = resp.status();
    let body = resp.text().unwrap_or_else(|_| "Unknown error".to_string());
    Error::IndexUnavailable(format!("{} failed ({}): {}", op, status, body))
}
