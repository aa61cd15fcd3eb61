//! Labeled corpus loading.
//!
//! A corpus is a named dataset split holding `(text, label)` records, one
//! JSON object per line (`{"text": "...", "label": 0}`). Splits resolve
//! either from a local directory or from a Hugging Face dataset repository;
//! in both cases the split `name` maps to a `name.jsonl` file.
//!
//! Iteration is lazy and restartable: [`Corpus::iter`] streams records from
//! the file in their native order, and calling it again starts over from the
//! first record.

use crate::core::error::{PipelineError, Result};
use crate::loaders::HfLoader;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing::info;

/// A single labeled text record. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub text: String,
    pub label: u32,
}

/// Where a dataset's split files live.
#[derive(Debug, Clone)]
pub enum CorpusSource {
    /// A local directory containing one `<split>.jsonl` per split.
    LocalDir(PathBuf),
    /// A Hugging Face dataset repository; split files are fetched through
    /// the hub's local cache.
    HubDataset(String),
}

impl CorpusSource {
    fn dataset_name(&self) -> String {
        match self {
            Self::LocalDir(dir) => dir.display().to_string(),
            Self::HubDataset(repo) => repo.clone(),
        }
    }
}

/// An opened dataset split.
#[derive(Debug, Clone)]
pub struct Corpus {
    dataset: String,
    split: String,
    path: PathBuf,
    limit: Option<usize>,
}

impl Corpus {
    /// Resolve a dataset split to its backing file.
    ///
    /// `limit` truncates iteration to the first N records. Fails with
    /// [`PipelineError::DatasetNotFound`] when the split file does not exist
    /// or cannot be fetched.
    pub fn open(source: &CorpusSource, split: &str, limit: Option<usize>) -> Result<Self> {
        let dataset = source.dataset_name();
        let filename = format!("{split}.jsonl");

        let path = match source {
            CorpusSource::LocalDir(dir) => {
                let path = dir.join(&filename);
                if !path.is_file() {
                    return Err(PipelineError::DatasetNotFound {
                        dataset,
                        split: split.to_string(),
                        reason: format!("no such file: {}", path.display()),
                    });
                }
                path
            }
            CorpusSource::HubDataset(repo) => HfLoader::dataset(repo, &filename)
                .load()
                .map_err(|e| PipelineError::DatasetNotFound {
                    dataset: repo.clone(),
                    split: split.to_string(),
                    reason: e.to_string(),
                })?,
        };

        info!(dataset = %dataset, split = %split, path = %path.display(), "opened corpus split");

        Ok(Self {
            dataset,
            split: split.to_string(),
            path,
            limit,
        })
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn split(&self) -> &str {
        &self.split
    }

    /// Stream records lazily in the file's native order.
    ///
    /// Each call opens the split file again, so repeated calls restart from
    /// the first record. Malformed lines surface as
    /// [`PipelineError::Encoding`] carrying the line number.
    pub fn iter(&self) -> Result<impl Iterator<Item = Result<CorpusRecord>>> {
        let file = File::open(&self.path).map_err(|e| PipelineError::DatasetNotFound {
            dataset: self.dataset.clone(),
            split: self.split.clone(),
            reason: e.to_string(),
        })?;

        let dataset = self.dataset.clone();
        let split = self.split.clone();
        let records = BufReader::new(file)
            .lines()
            .enumerate()
            .filter(|(_, line)| match line {
                Ok(line) => !line.trim().is_empty(),
                Err(_) => true,
            })
            .map(move |(idx, line)| {
                let line = line.map_err(|e| {
                    PipelineError::Encoding(format!(
                        "{dataset}:{split} line {}: {e}",
                        idx + 1
                    ))
                })?;
                serde_json::from_str(&line).map_err(|e| {
                    PipelineError::Encoding(format!(
                        "{dataset}:{split} line {}: malformed record: {e}",
                        idx + 1
                    ))
                })
            })
            .take(self.limit.unwrap_or(usize::MAX));

        Ok(records)
    }
}
