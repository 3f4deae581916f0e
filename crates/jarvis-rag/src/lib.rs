pub mod bootstrap;
pub mod pipeline;

pub use bootstrap::{bootstrap, build_pipeline, DefaultPipeline};
pub use pipeline::{RagPipeline, DEFAULT_TOP_K};
