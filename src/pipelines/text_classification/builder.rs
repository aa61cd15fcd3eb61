use super::model::TextClassificationModel;
use super::pipeline::TextClassificationPipeline;
use crate::core::error::Result;
use crate::core::{global_cache, ModelOptions};
use crate::pipelines::utils::{build_cache_key, DeviceRequest, DeviceSelectable};
use std::time::Duration;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::info;

pub struct TextClassificationPipelineBuilder<M: TextClassificationModel> {
    options: M::Options,
    device_request: DeviceRequest,
    record_timeout: Option<Duration>,
}

impl<M: TextClassificationModel> TextClassificationPipelineBuilder<M> {
    pub fn new(options: M::Options) -> Self {
        Self {
            options,
            device_request: DeviceRequest::Default,
            record_timeout: None,
        }
    }

    /// Best-effort per-record inference budget. Records that exceed it are
    /// reported as [`crate::PipelineError::InferenceTimeout`] without
    /// affecting subsequent records.
    pub fn record_timeout(mut self, budget: Duration) -> Self {
        self.record_timeout = Some(budget);
        self
    }

    pub fn build(self) -> Result<TextClassificationPipeline<M>>
    where
        M: Clone + Send + Sync + 'static,
        M::Options: ModelOptions + Clone,
    {
        let device = self.device_request.resolve()?;
        let key = build_cache_key(&self.options, &device);
        let model = global_cache()
            .get_or_create(&key, || M::new(self.options.clone(), device.clone()))?;

        let mut tokenizer = M::get_tokenizer(self.options)?;
        configure_fixed_length(&mut tokenizer, model.max_length())?;

        info!(
            classes = model.labels().len(),
            max_length = model.max_length(),
            "text classification pipeline ready"
        );

        Ok(TextClassificationPipeline {
            model,
            tokenizer,
            record_timeout: self.record_timeout,
        })
    }
}

impl<M: TextClassificationModel> DeviceSelectable for TextClassificationPipelineBuilder<M> {
    fn device_request_mut(&mut self) -> &mut DeviceRequest {
        &mut self.device_request
    }
}

impl TextClassificationPipelineBuilder<crate::models::bert::BertTextClassifier> {
    /// Pipeline backed by a BERT sequence-classification checkpoint.
    pub fn bert(model_repo: &str) -> Self {
        Self::new(crate::models::bert::BertClassifierOptions::new(model_repo))
    }

    /// Override the fixed sequence length (default 512, capped by the
    /// checkpoint's position-embedding size).
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.options.max_length = max_length;
        self
    }

    /// Override the class names when the checkpoint's config carries generic
    /// `LABEL_0`-style names or none at all.
    pub fn labels<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.label_names = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

/// Pin the tokenizer to fixed-length output: truncate to `max_length`, pad
/// shorter inputs with the vocabulary's pad token and a zero attention mask.
fn configure_fixed_length(tokenizer: &mut Tokenizer, max_length: usize) -> Result<()> {
    let pad_id = tokenizer
        .get_padding()
        .map(|p| p.pad_id)
        .or_else(|| tokenizer.token_to_id("[PAD]"))
        .or_else(|| tokenizer.token_to_id("<pad>"))
        .unwrap_or(0);
    let pad_token = tokenizer
        .id_to_token(pad_id)
        .unwrap_or_else(|| "[PAD]".to_string());

    tokenizer
        .with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(max_length),
            pad_id,
            pad_token,
            ..Default::default()
        }))
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| {
            crate::core::error::PipelineError::ModelUnavailable(format!(
                "failed to configure tokenizer truncation: {e}"
            ))
        })?;

    Ok(())
}
