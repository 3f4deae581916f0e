//! Vector index backends: hosted Pinecone and an in-process index with the same contract.
pub mod backend;
pub mod memory;
pub mod pinecone;
pub mod similarity;

pub use backend::IndexBackend;
pub use memory::MemoryIndex;
pub use pinecone::PineconeIndex;
pub use similarity::cosine_similarity;
