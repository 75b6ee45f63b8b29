use std::path::PathBuf;

use hf_hub::api::tokio::{Api, ApiRepo};
use tokenizers::Tokenizer;

use crate::error::{HealError, Result};

/// Unified tokenizer loader with common download logic.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Load a tokenizer from a local file path.
    pub fn from_file(path: &str) -> Result<Tokenizer> {
        Tokenizer::from_file(path)
            .map_err(|e| HealError::Tokenizer(format!("failed to load tokenizer from file: {e}")))
    }

    /// Download and load a tokenizer from the HuggingFace Hub.
    pub async fn from_hf_hub(repo_id: &str, filename: Option<&str>) -> Result<Tokenizer> {
        let api = Api::new()
            .map_err(|e| HealError::Tokenizer(format!("failed to create HF API: {e}")))?;

        let repo = api.model(repo_id.to_string());
        let tokenizer_path = Self::download_tokenizer_file(&repo, filename).await?;

        Self::from_file(
            tokenizer_path
                .to_str()
                .ok_or_else(|| HealError::Tokenizer("invalid tokenizer path".to_string()))?,
        )
    }

    /// Download a tokenizer file from a repository.
    async fn download_tokenizer_file(repo: &ApiRepo, filename: Option<&str>) -> Result<PathBuf> {
        if let Some(file) = filename {
            repo.get(file).await.map_err(|e| {
                HealError::Tokenizer(format!("failed to download tokenizer file '{file}': {e}"))
            })
        } else {
            // Try common tokenizer filenames in order.
            let filenames = ["tokenizer.json", "tokenizer.model"];

            for file in filenames {
                if let Ok(path) = repo.get(file).await {
                    return Ok(path);
                }
            }

            Err(HealError::Tokenizer(
                "no tokenizer file found. Tried: tokenizer.json, tokenizer.model".to_string(),
            ))
        }
    }

    /// Resolve a tokenizer from a specific source: a local `.json` path
    /// or a HuggingFace repo id (for GGUF models whose own repo ships no
    /// tokenizer).
    pub async fn from_source(api: &Api, source: &str) -> Result<PathBuf> {
        if source.ends_with(".json") && std::path::Path::new(source).exists() {
            return Ok(PathBuf::from(source));
        }

        let repo = api.model(source.to_string());

        if let Ok(path) = repo.get("tokenizer.json").await {
            return Ok(path);
        }

        // tokenizer.model covers sentencepiece-based repos.
        if let Ok(path) = repo.get("tokenizer.model").await {
            return Ok(path);
        }

        Err(HealError::Tokenizer(format!(
            "failed to find tokenizer in specified source: {source}. Please check network connectivity and that the model repository exists."
        )))
    }
}
