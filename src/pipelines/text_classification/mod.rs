//! Text classification pipeline for labeling documents against a fixed
//! class schema.
//!
//! This module runs pretrained sequence-classification checkpoints over raw
//! text: each input is tokenized to the model's fixed length, pushed through
//! the frozen forward pass, and normalized into a per-class probability
//! distribution. Batch runs over a labeled corpus pair every prediction with
//! its ground-truth label for reporting.
//!
//! ## Main Types
//!
//! - [`TextClassificationPipeline`] - High-level interface for classification
//! - [`TextClassificationPipelineBuilder`] - Builder pattern for pipeline
//!   configuration
//! - [`TextClassificationModel`] - Trait for classifier model implementations
//! - [`Prediction`] - Per-class probabilities plus the arg-max label
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use textclass::pipelines::text_classification::*;
//!
//! let pipeline = TextClassificationPipelineBuilder::bert("textattack/bert-base-uncased-ag-news")
//!     .labels(["World", "Sports", "Business", "Sci/Tech"])
//!     .build()?;
//!
//! let prediction = pipeline.predict("Oil prices climbed again on Monday.")?;
//! println!(
//!     "{} ({:.2})",
//!     pipeline.labels().name(prediction.predicted_label).unwrap(),
//!     prediction.confidence()
//! );
//! # Ok::<(), textclass::PipelineError>(())
//! ```

pub mod builder;
pub mod model;
pub mod pipeline;
pub mod postprocess;

pub use builder::TextClassificationPipelineBuilder;
pub use model::{LabelSchema, TextClassificationModel, TokenizedInput};
pub use pipeline::{RecordReport, TextClassificationPipeline};
pub use postprocess::{argmax, finalize, softmax, Prediction};

pub use crate::core::error::{PipelineError, Result};
pub use crate::corpus::{Corpus, CorpusRecord, CorpusSource};
pub use crate::models::bert::{BertClassifierOptions, BertTextClassifier};
pub use crate::pipelines::utils::DeviceSelectable;
