//! Model and tokenizer loading utilities for Hugging Face Hub integration.
//!
//! This module provides loaders for downloading and loading the artifacts a
//! classification pipeline needs:
//! - Model weight files (safetensors, with a pytorch_model.bin fallback)
//! - Model configuration files (JSON)
//! - Tokenizers (JSON format)
//! - Corpus split files from dataset repositories
//!
//! All downloads go through the hub's local cache; a file is only fetched
//! over the network the first time it is requested.

use crate::core::error::{PipelineError, Result};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use std::path::PathBuf;
use tokenizers::Tokenizer;
use tracing::debug;

/// Generic Hugging Face file loader.
#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
    pub filename: String,
    pub repo_type: RepoType,
}

impl HfLoader {
    /// Loader for a file in a model repository.
    pub fn model(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
            repo_type: RepoType::Model,
        }
    }

    /// Loader for a file in a dataset repository.
    pub fn dataset(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
            repo_type: RepoType::Dataset,
        }
    }

    pub fn load(&self) -> Result<PathBuf> {
        let api = Api::new()
            .map_err(|e| PipelineError::ModelUnavailable(format!("hub api init failed: {e}")))?;
        let repo = api.repo(Repo::new(self.repo.clone(), self.repo_type));

        debug!(repo = %self.repo, filename = %self.filename, "resolving hub file");
        repo.get(self.filename.as_str()).map_err(|e| {
            PipelineError::ModelUnavailable(format!(
                "failed to fetch `{}` from `{}`: {e}",
                self.filename, self.repo
            ))
        })
    }
}

/// Loads a tokenizer from a model repository's `tokenizer.json`.
#[derive(Debug, Clone)]
pub struct TokenizerLoader {
    pub tokenizer_file_loader: HfLoader,
}

impl TokenizerLoader {
    pub fn new(repo: &str) -> Self {
        Self {
            tokenizer_file_loader: HfLoader::model(repo, "tokenizer.json"),
        }
    }

    pub fn load(&self) -> Result<Tokenizer> {
        let tokenizer_file_path = self.tokenizer_file_loader.load()?;

        Tokenizer::from_file(tokenizer_file_path)
            .map_err(|e| PipelineError::ModelUnavailable(format!("failed to load tokenizer: {e}")))
    }
}

/// Resolves a model repository's weight file.
///
/// Prefers `model.safetensors` and falls back to `pytorch_model.bin`, the two
/// layouts pretrained classifier checkpoints ship with.
#[derive(Debug, Clone)]
pub struct ModelWeightsLoader {
    pub repo: String,
}

impl ModelWeightsLoader {
    pub fn new(repo: &str) -> Self {
        Self { repo: repo.into() }
    }

    pub fn load(&self) -> Result<PathBuf> {
        match HfLoader::model(&self.repo, "model.safetensors").load() {
            Ok(safetensors) => Ok(safetensors),
            Err(_) => match HfLoader::model(&self.repo, "pytorch_model.bin").load() {
                Ok(pytorch_model) => Ok(pytorch_model),
                Err(e) => Err(PipelineError::ModelUnavailable(format!(
                    "model weights not found in repo `{}`; expected `model.safetensors` or `pytorch_model.bin`: {e}",
                    self.repo
                ))),
            },
        }
    }
}

/// Loads a model repository's `config.json` as a raw string for parsing.
#[derive(Debug, Clone)]
pub struct ModelConfigLoader {
    pub config_file_loader: HfLoader,
}

impl ModelConfigLoader {
    pub fn new(repo: &str) -> Self {
        Self {
            config_file_loader: HfLoader::model(repo, "config.json"),
        }
    }

    pub fn load(&self) -> Result<String> {
        let config_file_path = self.config_file_loader.load()?;

        std::fs::read_to_string(&config_file_path).map_err(|e| {
            PipelineError::ModelUnavailable(format!(
                "failed to read config file {config_file_path:?}: {e}"
            ))
        })
    }
}
