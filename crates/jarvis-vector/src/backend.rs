use jarvis_core::config::{IndexBackendKind, IndexSettings};
use jarvis_core::types::{IndexEntry, RetrievalMatch};
use jarvis_core::{Result, VectorIndex};

use crate::memory::MemoryIndex;
use crate::pinecone::PineconeIndex;

/// The index selected by `index.backend`.
pub enum IndexBackend {
    Pinecone(PineconeIndex),
    Memory(MemoryIndex),
}

impl IndexBackend {
    pub fn from_settings(settings: &IndexSettings) -> Result<Self> {
        match settings.backend {
            IndexBackendKind::Pinecone => {
                tracing::info!(index = %settings.name, controller = %settings.controller_url, "using Pinecone index");
                Ok(Self::Pinecone(PineconeIndex::new(settings)?))
            }
            IndexBackendKind::Memory => {
                tracing::info!(index = %settings.name, "using in-memory index");
                Ok(Self::Memory(MemoryIndex::new(settings.name.clone())))
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Pinecone(i) => i.name(),
            Self::Memory(i) => i.name(),
        }
    }

    fn inner(&self) -> &dyn VectorIndex {
        match self {
            Self::Pinecone(i) => i,
            Self::Memory(i) => i,
        }
    }
}

impl VectorIndex for IndexBackend {
    fn ensure_index(&self, dimension: usize) -> Result<()> {
        self.inner().ensure_index(dimension)
    }

    fn upsert(&self, entries: &[IndexEntry]) -> Result<()> {
        self.inner().upsert(entries)
    }

    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievalMatch>> {
        self.inner().query(vector, top_k)
    }

    fn delete_index(&self) -> Result<()> {
        self.inner().delete_index()
    }
}
