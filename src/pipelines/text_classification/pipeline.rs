use super::model::{LabelSchema, TextClassificationModel, TokenizedInput};
use super::postprocess::{finalize, Prediction};
use crate::core::error::{PipelineError, Result};
use crate::corpus::{Corpus, CorpusRecord};
use std::fmt::Write as _;
use std::time::{Duration, Instant};
use tokenizers::Tokenizer;
use tracing::{debug, warn};

/// The outcome of classifying one corpus record.
///
/// Failed records keep their input alongside the error so a batch report
/// never silently drops anything.
#[derive(Debug)]
pub struct RecordReport {
    pub record: CorpusRecord,
    pub outcome: Result<Prediction>,
}

pub struct TextClassificationPipeline<M: TextClassificationModel> {
    pub(crate) model: M,
    pub(crate) tokenizer: Tokenizer,
    pub(crate) record_timeout: Option<Duration>,
}

/// Force `ids`/`mask` to exactly `len` entries: truncate over-long sequences,
/// pad short ones with `pad_id` and a zero attention mask.
pub(crate) fn fit_to_length(ids: &mut Vec<u32>, mask: &mut Vec<u32>, len: usize, pad_id: u32) {
    ids.truncate(len);
    mask.truncate(len);
    ids.resize(len, pad_id);
    mask.resize(len, 0);
}

impl<M: TextClassificationModel> TextClassificationPipeline<M> {
    /// Tokenize `text` into a fixed-length input.
    ///
    /// Deterministic: the tokenizer's vocabulary and padding/truncation
    /// settings are frozen at build time. The empty string is valid and
    /// yields the special tokens followed by padding.
    pub fn encode(&self, text: &str) -> Result<TokenizedInput> {
        let encoding = self.tokenizer.encode(text, true)?;

        let mut ids = encoding.get_ids().to_vec();
        let mut attention_mask = encoding.get_attention_mask().to_vec();

        // The tokenizer is configured for fixed-length output; this guards
        // the exact-length invariant against checkpoints whose tokenizer
        // config overrides ours.
        let pad_id = self.tokenizer.get_padding().map(|p| p.pad_id).unwrap_or(0);
        fit_to_length(&mut ids, &mut attention_mask, self.model.max_length(), pad_id);

        Ok(TokenizedInput {
            ids,
            attention_mask,
        })
    }

    /// Classify a single text: encode, forward pass, probability transform.
    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let input = self.encode(text)?;
        let logits = self.model.classify(&input)?;
        finalize(&logits, self.model.labels())
    }

    /// Classify every record of a corpus split, in order.
    ///
    /// Record-level failures are contained: the failing record appears in the
    /// returned reports with its error, and processing continues with the
    /// next record. Only corpus-level failures (unreadable or malformed split
    /// data) abort the batch.
    pub fn classify_corpus(&self, corpus: &Corpus) -> Result<Vec<RecordReport>> {
        let mut reports = Vec::new();

        for record in corpus.iter()? {
            let record = record?;
            let started = Instant::now();
            let mut outcome = self.predict(&record.text);
            let elapsed = started.elapsed();

            if let (Ok(_), Some(budget)) = (&outcome, self.record_timeout) {
                if elapsed > budget {
                    outcome = Err(PipelineError::InferenceTimeout {
                        budget_ms: budget.as_millis() as u64,
                        elapsed_ms: elapsed.as_millis() as u64,
                    });
                }
            }

            match &outcome {
                Ok(prediction) => debug!(
                    label = self.labels().name(prediction.predicted_label),
                    confidence = prediction.confidence(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "classified record"
                ),
                Err(error) => warn!(
                    %error,
                    text = %record.text,
                    "record failed, continuing with the rest of the batch"
                ),
            }

            reports.push(RecordReport { record, outcome });
        }

        Ok(reports)
    }

    /// Render one record's report: the input text, its ground-truth label
    /// name, and the full per-class distribution keyed by label name (or the
    /// error for failed records).
    pub fn render_report(&self, report: &RecordReport) -> String {
        let schema = self.labels();
        let truth = schema
            .name(report.record.label as usize)
            .unwrap_or("<unknown>");

        let mut out = String::new();
        let _ = writeln!(out, "text: {}", report.record.text);
        let _ = writeln!(out, "truth: {truth}");

        match &report.outcome {
            Ok(prediction) => {
                let predicted = schema
                    .name(prediction.predicted_label)
                    .unwrap_or("<unknown>");
                let _ = writeln!(out, "predicted: {predicted}");
                for (id, p) in prediction.probabilities.iter().enumerate() {
                    let name = schema.name(id).unwrap_or("<unknown>");
                    let _ = writeln!(out, "  {name}: {p:.4}");
                }
            }
            Err(error) => {
                let _ = writeln!(out, "error: {error}");
            }
        }

        out
    }

    pub fn labels(&self) -> &LabelSchema {
        self.model.labels()
    }

    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}
