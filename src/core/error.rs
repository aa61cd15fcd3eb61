use thiserror::Error;

/// Error type shared by every pipeline stage.
///
/// The variants split into two groups. `DatasetNotFound` and
/// `ModelUnavailable` occur while setting up a run and are fatal: no record
/// can be processed without a corpus and loaded weights. The remaining
/// variants are scoped to a single record; batch processing reports them and
/// moves on to the next record.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The named dataset/split could not be resolved to a corpus file.
    #[error("dataset `{dataset}` split `{split}` not found: {reason}")]
    DatasetNotFound {
        dataset: String,
        split: String,
        reason: String,
    },

    /// Tokenization failed, or a corpus record was malformed.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// Model weights, config, or tokenizer could not be loaded at startup.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// The forward pass failed, including inputs whose shape does not match
    /// the model's expected dimensions.
    #[error("inference failed: {0}")]
    Inference(String),

    /// A logits vector did not match the label schema's class count.
    #[error("shape mismatch: expected {expected} classes, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// A record exceeded the configured per-record inference budget.
    /// Best-effort: the forward pass runs to completion before the check.
    #[error("inference exceeded {budget_ms}ms budget (took {elapsed_ms}ms)")]
    InferenceTimeout { budget_ms: u64, elapsed_ms: u64 },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<candle_core::Error> for PipelineError {
    fn from(err: candle_core::Error) -> Self {
        Self::Inference(err.to_string())
    }
}

impl From<tokenizers::Error> for PipelineError {
    fn from(err: tokenizers::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl PipelineError {
    /// True for errors that abort the whole run rather than a single record.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DatasetNotFound { .. } | Self::ModelUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_errors_are_fatal() {
        let err = PipelineError::DatasetNotFound {
            dataset: "ag_news".into(),
            split: "test".into(),
            reason: "no such file".into(),
        };
        assert!(err.is_fatal());
        assert!(PipelineError::ModelUnavailable("missing weights".into()).is_fatal());
    }

    #[test]
    fn record_errors_are_not_fatal() {
        assert!(!PipelineError::Encoding("bad input".into()).is_fatal());
        assert!(!PipelineError::ShapeMismatch {
            expected: 4,
            actual: 2
        }
        .is_fatal());
        assert!(!PipelineError::InferenceTimeout {
            budget_ms: 100,
            elapsed_ms: 250
        }
        .is_fatal());
    }
}
