use crate::core::error::{PipelineError, Result};
use tokenizers::Tokenizer;

/// A tokenized input ready for the classifier.
///
/// Both sequences have exactly the model's fixed length: over-long inputs are
/// truncated, short ones padded with the pad id and a zero attention mask.
/// Owned by the single inference call that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedInput {
    pub ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
}

impl TokenizedInput {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Ordered mapping from class id to human-readable class name.
///
/// Fixed at classifier-load time and shared read-only by the postprocessor
/// and reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSchema {
    names: Vec<String>,
}

impl LabelSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a schema from a model config's `id2label` map, ordered by the
    /// numeric class id.
    pub fn from_id2label(
        id2label: &std::collections::HashMap<String, String>,
    ) -> Result<Self> {
        let mut entries: Vec<(usize, String)> = Vec::with_capacity(id2label.len());
        for (id, name) in id2label {
            let id: usize = id.parse().map_err(|_| {
                PipelineError::ModelUnavailable(format!(
                    "config id2label has non-numeric class id `{id}`"
                ))
            })?;
            entries.push((id, name.clone()));
        }
        entries.sort_by_key(|(id, _)| *id);

        for (expected, (id, _)) in entries.iter().enumerate() {
            if *id != expected {
                return Err(PipelineError::ModelUnavailable(format!(
                    "config id2label is not contiguous: missing class id {expected}"
                )));
            }
        }

        Ok(Self {
            names: entries.into_iter().map(|(_, name)| name).collect(),
        })
    }

    /// Number of classes C.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of the given class id, if in range.
    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Trait for text classification model implementations.
///
/// A model wraps frozen pretrained weights loaded once at startup; `classify`
/// is a pure function of the input and those weights. Implementations are
/// `Clone` handles over shared weights so pipelines can reuse a cached model.
pub trait TextClassificationModel {
    type Options: std::fmt::Debug + Clone;

    fn new(options: Self::Options, device: candle_core::Device) -> Result<Self>
    where
        Self: Sized;

    /// Run the frozen forward pass, returning raw logits of length C.
    ///
    /// Fails with [`PipelineError::Inference`] when the input shape does not
    /// match the model's expected dimensions.
    fn classify(&self, input: &TokenizedInput) -> Result<Vec<f32>>;

    /// The class schema this checkpoint was fine-tuned with.
    fn labels(&self) -> &LabelSchema;

    /// The fixed sequence length L every input is padded/truncated to.
    fn max_length(&self) -> usize;

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer>;

    fn device(&self) -> &candle_core::Device;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn schema_orders_by_numeric_id() {
        let id2label: HashMap<String, String> = [
            ("2".to_string(), "Business".to_string()),
            ("0".to_string(), "World".to_string()),
            ("3".to_string(), "Sci/Tech".to_string()),
            ("1".to_string(), "Sports".to_string()),
        ]
        .into();

        let schema = LabelSchema::from_id2label(&id2label).unwrap();
        assert_eq!(schema.len(), 4);
        assert_eq!(schema.name(0), Some("World"));
        assert_eq!(schema.name(1), Some("Sports"));
        assert_eq!(schema.name(2), Some("Business"));
        assert_eq!(schema.name(3), Some("Sci/Tech"));
        assert_eq!(schema.name(4), None);
    }

    #[test]
    fn schema_rejects_gaps_and_bad_ids() {
        let sparse: HashMap<String, String> = [
            ("0".to_string(), "a".to_string()),
            ("2".to_string(), "b".to_string()),
        ]
        .into();
        assert!(LabelSchema::from_id2label(&sparse).is_err());

        let garbage: HashMap<String, String> =
            [("zero".to_string(), "a".to_string())].into();
        assert!(LabelSchema::from_id2label(&garbage).is_err());
    }
}
