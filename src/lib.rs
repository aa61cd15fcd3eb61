pub mod core;
pub mod corpus;
pub mod loaders;
pub mod models;
pub mod pipelines;

// Re-export core types
pub use self::core::{global_cache, ModelCache, ModelOptions, PipelineError, Result};
pub use corpus::{Corpus, CorpusRecord, CorpusSource};

// Re-export model types for easier access
pub use models::{BertClassifierOptions, BertTextClassifier};
