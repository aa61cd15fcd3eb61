//! BERT sequence-classification adapter.
//!
//! The encoder itself comes from `candle_transformers`; this module adds the
//! classification head found in fine-tuned BERT checkpoints (pooler dense +
//! tanh over the CLS token, then a linear projection to the class logits)
//! and the loading glue that resolves a hub repo id to config, weights,
//! tokenizer, and label schema.
//!
//! Weights are frozen: loading happens once, `classify` never mutates model
//! state, and handles are cheap clones over the shared weights.

use crate::core::error::{PipelineError, Result};
use crate::core::ModelOptions;
use crate::loaders::{ModelConfigLoader, ModelWeightsLoader, TokenizerLoader};
use crate::pipelines::text_classification::model::{
    LabelSchema, TextClassificationModel, TokenizedInput,
};
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::{linear, Linear, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokenizers::Tokenizer;
use tracing::info;

/// Options identifying a BERT classification checkpoint.
#[derive(Debug, Clone)]
pub struct BertClassifierOptions {
    /// Hub repository holding the fine-tuned checkpoint.
    pub model_repo: String,
    /// Requested fixed sequence length L; capped by the checkpoint's
    /// position-embedding size at load time.
    pub max_length: usize,
    /// Class-name override for checkpoints whose config carries generic or
    /// missing `id2label` entries.
    pub label_names: Option<Vec<String>>,
}

impl BertClassifierOptions {
    pub fn new(model_repo: &str) -> Self {
        Self {
            model_repo: model_repo.into(),
            max_length: 512,
            label_names: None,
        }
    }
}

impl ModelOptions for BertClassifierOptions {
    fn cache_key(&self) -> String {
        match &self.label_names {
            Some(names) => format!("{}-{}-{}", self.model_repo, self.max_length, names.join("/")),
            None => format!("{}-{}", self.model_repo, self.max_length),
        }
    }
}

/// The fields this adapter needs from a checkpoint's raw `config.json`,
/// beyond what the encoder's own config covers.
#[derive(Debug, Deserialize)]
struct RawClassifierConfig {
    hidden_size: usize,
    max_position_embeddings: usize,
    id2label: Option<HashMap<String, String>>,
}

/// Pooler + classifier projection from a fine-tuned checkpoint.
#[derive(Debug, Clone)]
struct ClassificationHead {
    pooler: Linear,
    classifier: Linear,
}

impl ClassificationHead {
    fn load(vb: VarBuilder, hidden_size: usize, num_labels: usize) -> candle_core::Result<Self> {
        // Checkpoints exported from the reference implementation prefix the
        // encoder and pooler with `bert.`; standalone exports do not.
        let pooler = linear(hidden_size, hidden_size, vb.pp("bert.pooler.dense"))
            .or_else(|_| linear(hidden_size, hidden_size, vb.pp("pooler.dense")))?;
        let classifier = linear(hidden_size, num_labels, vb.pp("classifier"))?;
        Ok(Self { pooler, classifier })
    }

    fn forward(&self, hidden_states: &Tensor) -> candle_core::Result<Tensor> {
        let cls = hidden_states.i((.., 0, ..))?;
        cls.apply(&self.pooler)?.tanh()?.apply(&self.classifier)
    }
}

struct BertTextClassifierInner {
    model: BertModel,
    head: ClassificationHead,
    labels: LabelSchema,
    max_length: usize,
    device: Device,
}

/// A frozen BERT sequence-classification model.
#[derive(Clone)]
pub struct BertTextClassifier {
    inner: Arc<BertTextClassifierInner>,
}

impl BertTextClassifier {
    pub fn new(options: BertClassifierOptions, device: Device) -> Result<Self> {
        let unavailable =
            |e: candle_core::Error| PipelineError::ModelUnavailable(e.to_string());

        let config_content = ModelConfigLoader::new(&options.model_repo).load()?;
        let raw: RawClassifierConfig = serde_json::from_str(&config_content).map_err(|e| {
            PipelineError::ModelUnavailable(format!("failed to parse classifier config: {e}"))
        })?;
        let config: Config = serde_json::from_str(&config_content).map_err(|e| {
            PipelineError::ModelUnavailable(format!("failed to parse model config: {e}"))
        })?;

        let labels = match &options.label_names {
            Some(names) => LabelSchema::new(names.clone()),
            None => {
                let id2label = raw.id2label.as_ref().ok_or_else(|| {
                    PipelineError::ModelUnavailable(format!(
                        "config for `{}` has no id2label map and no label override was given",
                        options.model_repo
                    ))
                })?;
                LabelSchema::from_id2label(id2label)?
            }
        };

        if labels.is_empty() {
            return Err(PipelineError::ModelUnavailable(format!(
                "label schema for `{}` is empty",
                options.model_repo
            )));
        }

        let weights_filename = ModelWeightsLoader::new(&options.model_repo).load()?;
        let vb = if weights_filename
            .extension()
            .is_some_and(|ext| ext == "safetensors")
        {
            unsafe {
                VarBuilder::from_mmaped_safetensors(&[weights_filename], DType::F32, &device)
                    .map_err(unavailable)?
            }
        } else {
            VarBuilder::from_pth(&weights_filename, DType::F32, &device).map_err(unavailable)?
        };

        let model = BertModel::load(vb.clone(), &config).map_err(unavailable)?;
        let head =
            ClassificationHead::load(vb, raw.hidden_size, labels.len()).map_err(unavailable)?;

        let max_length = options.max_length.min(raw.max_position_embeddings);

        info!(
            repo = %options.model_repo,
            classes = labels.len(),
            max_length,
            "loaded BERT classifier"
        );

        Ok(Self {
            inner: Arc::new(BertTextClassifierInner {
                model,
                head,
                labels,
                max_length,
                device,
            }),
        })
    }

    pub fn get_tokenizer(options: &BertClassifierOptions) -> Result<Tokenizer> {
        TokenizerLoader::new(&options.model_repo).load()
    }
}

impl TextClassificationModel for BertTextClassifier {
    type Options = BertClassifierOptions;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        BertTextClassifier::new(options, device)
    }

    fn classify(&self, input: &TokenizedInput) -> Result<Vec<f32>> {
        let inner = &self.inner;

        if input.ids.len() != inner.max_length {
            return Err(PipelineError::Inference(format!(
                "input has {} tokens, model expects sequences of length {}",
                input.ids.len(),
                inner.max_length
            )));
        }
        if input.attention_mask.len() != input.ids.len() {
            return Err(PipelineError::Inference(format!(
                "attention mask length {} does not match token count {}",
                input.attention_mask.len(),
                input.ids.len()
            )));
        }

        let input_ids = Tensor::new(input.ids.as_slice(), &inner.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(input.attention_mask.as_slice(), &inner.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden_states =
            inner
                .model
                .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let logits = inner.head.forward(&hidden_states)?;

        Ok(logits.squeeze(0)?.to_vec1::<f32>()?)
    }

    fn labels(&self) -> &LabelSchema {
        &self.inner.labels
    }

    fn max_length(&self) -> usize {
        self.inner.max_length
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        BertTextClassifier::get_tokenizer(&options)
    }

    fn device(&self) -> &Device {
        &self.inner.device
    }
}
