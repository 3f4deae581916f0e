//! In-process vector index with exact cosine top-k.
//!
//! Same contract as the hosted index: the index must be created with
//! `ensure_index` before use, upserts replace by id, and every vector must
//! match the dimension the index was created with.
use parking_lot::RwLock;
use std::collections::HashMap;

use jarvis_core::traits::check_dimension;
use jarvis_core::types::{ChunkId, IndexEntry, RetrievalMatch};
use jarvis_core::{Error, Result, VectorIndex};

use crate::similarity::cosine_similarity;

struct Table {
    dimension: usize,
    entries: HashMap<ChunkId, IndexEntry>,
}

pub struct MemoryIndex {
    name: String,
    table: RwLock<Option<Table>>,
}

impl MemoryIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), table: RwLock::new(None) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exists(&self) -> bool {
        self.table.read().is_some()
    }

    pub fn len(&self) -> usize {
        self.table.read().as_ref().map_or(0, |t| t.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn missing(&self) -> Error {
        Error::IndexUnavailable(format!("index '{}' does not exist", self.name))
    }
}

impl VectorIndex for MemoryIndex {
    fn ensure_index(&self, dimension: usize) -> Result<()> {
        let mut guard = self.table.write();
        match guard.as_ref() {
            Some(t) => check_dimension(t.dimension, dimension),
            None => {
                tracing::info!(index = %self.name, dimension, "creating in-memory index");
                *guard = Some(Table { dimension, entries: HashMap::new() });
                Ok(())
            }
        }
    }

    fn upsert(&self, entries: &[IndexEntry]) -> Result<()> {
        let mut guard = self.table.write();
        let table = guard.as_mut().ok_or_else(|| self.missing())?;
        // validate the whole batch before touching the table
        for e in entries {
            check_dimension(table.dimension, e.vector.len())?;
        }
        for e in entries {
            table.entries.insert(e.id.clone(), e.clone());
        }
        tracing::debug!(index = %self.name, upserted = entries.len(), total = table.entries.len(), "upsert");
        Ok(())
    }

    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievalMatch>> {
        let guard = self.table.read();
        let table = guard.as_ref().ok_or_else(|| self.missing())?;
        check_dimension(table.dimension, vector.len())?;
        let mut hits: Vec<RetrievalMatch> = table
            .entries
            .values()
            .map(|e| RetrievalMatch {
                id: e.id.clone(),
                score: cosine_similarity(vector, &e.vector),
                metadata: e.metadata.clone(),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(top_k);
        Ok(hits)
    }

    fn delete_index(&self) -> Result<()> {
        if self.table.write().take().is_some() {
            tracing::info!(index = %self.name, "deleted in-memory index");
        }
        Ok(())
    }
}
