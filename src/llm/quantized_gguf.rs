use std::collections::HashMap;
use std::io::Seek;

use candle_core::quantized::gguf_file;
use candle_core::{DType, Device, Result as CandleResult, Tensor};
use candle_transformers::models::quantized_gemma3::ModelWeights as QuantizedGemmaModel;
use candle_transformers::models::quantized_llama::ModelWeights as QuantizedLlamaModel;
use hf_hub::api::tokio::Api;
use tokenizers::Tokenizer;

use crate::error::{HealError, Result};
use crate::healing::HealConfig;
use crate::llm::{ConstrainedGenerator, ConstrainedStep};
use crate::tokenizer::{TokenizerLoader, TokenizerWrapper};

/// GGUF-backed constrained generator.
///
/// Loads any quantized GGUF checkpoint, detects the architecture from
/// the file's metadata, and answers `generate_one` with a single
/// full-context forward pass followed by a constrained sampling step.
pub struct GgufGenerator {
    model: ModelType,
    tokenizer: TokenizerWrapper,
    device: Device,
    model_id: String,
    bos_token_id: Option<u32>,
    step: ConstrainedStep,
}

enum ModelType {
    Llama(QuantizedLlamaModel),
    Gemma(QuantizedGemmaModel),
    // Mistral uses the Llama loader due to tensor naming compatibility.
}

impl GgufGenerator {
    /// Load a quantized model from a GGUF file on the HuggingFace Hub.
    ///
    /// `model_id` takes the form `repo` or `repo@file.gguf`; the exact
    /// filename is required since GGUF repos ship several quantizations.
    pub async fn from_pretrained(
        model_id: &str,
        device: Device,
        tokenizer_source: Option<&str>,
        config: &HealConfig,
    ) -> Result<Self> {
        let (actual_model_id, gguf_file) = match model_id.find('@') {
            Some(pos) => {
                let (id, filename) = model_id.split_at(pos);
                (id, Some(&filename[1..]))
            }
            None => (model_id, None),
        };

        let api = Api::new()
            .map_err(|e| candle_core::Error::Msg(format!("Failed to create HF API: {e}")))?;
        let repo = api.model(actual_model_id.to_string());

        let gguf_filename = match gguf_file {
            Some(filename) => repo
                .get(filename)
                .await
                .map_err(|e| {
                    candle_core::Error::Msg(format!(
                        "Failed to download GGUF file '{filename}': {e}"
                    ))
                })?
                .to_string_lossy()
                .to_string(),
            None => {
                return Err(candle_core::Error::Msg(
                    "Please specify a GGUF filename as model_id@file.gguf".to_string(),
                )
                .into());
            }
        };

        // Read GGUF metadata to determine the architecture.
        let mut file = std::fs::File::open(&gguf_filename).map_err(candle_core::Error::from)?;
        let content = gguf_file::Content::read(&mut file)?;
        let architecture = Self::detect_architecture(&content, actual_model_id)?;

        let tokenizer_filename = match tokenizer_source {
            Some(source) => TokenizerLoader::from_source(&api, source).await?,
            None => TokenizerLoader::from_source(&api, actual_model_id).await?,
        };
        let tokenizer = Tokenizer::from_file(tokenizer_filename)
            .map_err(|e| HealError::Tokenizer(format!("failed to load tokenizer: {e}")))?;

        let bos_token_id = Self::determine_bos_token(&tokenizer, &architecture);

        file.seek(std::io::SeekFrom::Start(0))
            .map_err(candle_core::Error::from)?;
        let content = gguf_file::Content::read(&mut file)?;

        let model = match architecture.as_str() {
            "llama" | "mistral" => {
                // Both use the same GGUF format with llama.cpp tensor names.
                let model = QuantizedLlamaModel::from_gguf(content, &mut file, &device)?;
                ModelType::Llama(model)
            }
            "gemma" | "gemma2" | "gemma3" => {
                let model = QuantizedGemmaModel::from_gguf(content, &mut file, &device)?;
                ModelType::Gemma(model)
            }
            _ => {
                return Err(candle_core::Error::Msg(format!(
                    "Unsupported architecture: {architecture}. Supported: llama, mistral, gemma"
                ))
                .into());
            }
        };

        tracing::debug!(model = actual_model_id, %architecture, "loaded GGUF model");

        Ok(Self {
            model,
            tokenizer: TokenizerWrapper::new(tokenizer),
            device,
            model_id: actual_model_id.to_string(),
            bos_token_id,
            step: ConstrainedStep::from_config(config),
        })
    }

    /// Detect architecture from GGUF metadata or the model name.
    fn detect_architecture(content: &gguf_file::Content, model_id: &str) -> CandleResult<String> {
        if let Some(gguf_file::Value::String(arch)) = content.metadata.get("general.architecture") {
            return Ok(arch.clone());
        }

        let model_lower = model_id.to_lowercase();
        if model_lower.contains("llama") || model_lower.contains("tinyllama") {
            Ok("llama".to_string())
        } else if model_lower.contains("mistral") {
            Ok("mistral".to_string())
        } else if model_lower.contains("gemma") {
            Ok("gemma".to_string())
        } else {
            Err(candle_core::Error::Msg(
                "Could not determine model architecture from metadata or name".to_string(),
            ))
        }
    }

    /// Resolve the start-of-sequence token for the fully-discarded-prompt
    /// fallback.
    fn determine_bos_token(tokenizer: &Tokenizer, architecture: &str) -> Option<u32> {
        let vocab = tokenizer.get_vocab(true);

        match architecture {
            "llama" | "mistral" => vocab
                .get("<s>")
                .or_else(|| vocab.get("<|begin_of_text|>"))
                .copied(),
            "gemma" | "gemma2" | "gemma3" => vocab.get("<bos>").copied(),
            _ => vocab.get("<s>").copied(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_id
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// A clone of the model's tokenizer, for building the healer that
    /// drives this backend.
    pub fn clone_tokenizer(&self) -> TokenizerWrapper {
        self.tokenizer.clone()
    }

    /// Forward the whole context and return the last position's logits.
    fn forward_last_logits(&mut self, context: &[u32]) -> CandleResult<Tensor> {
        let input = Tensor::new(context, &self.device)?.unsqueeze(0)?;
        let input = input.contiguous()?;

        // index_pos 0 resets the quantized models' internal KV cache, so
        // repeated single steps always see a consistent context.
        let logits = match &mut self.model {
            ModelType::Llama(model) => model.forward(&input, 0)?,
            ModelType::Gemma(model) => model.forward(&input, 0)?,
        };

        let logits = logits.squeeze(0)?;
        let logits = if logits.dims().len() == 2 {
            let seq_len = logits.dim(0)?;
            logits.narrow(0, seq_len - 1, 1)?.squeeze(0)?
        } else {
            logits
        };

        logits.to_dtype(DType::F32)
    }
}

impl ConstrainedGenerator for GgufGenerator {
    fn generate_one(
        &mut self,
        context: &[u32],
        allowed: &[u32],
        bias: &HashMap<u32, f32>,
    ) -> Result<u32> {
        if allowed.is_empty() {
            return Err(
                candle_core::Error::Msg("empty candidate set for constrained step".to_string())
                    .into(),
            );
        }

        let mut ctx = context.to_vec();
        if ctx.is_empty() {
            match self.bos_token_id {
                Some(bos) => ctx.push(bos),
                None => {
                    return Err(candle_core::Error::Msg(
                        "empty context and the tokenizer defines no BOS token".to_string(),
                    )
                    .into());
                }
            }
        }

        let logits = self.forward_last_logits(&ctx)?;
        let logits = self.step.constrain_logits(&logits, allowed, bias)?;
        let token = self.step.sample(&logits)?;

        if !allowed.contains(&token) {
            return Err(HealError::TokenOutsideCandidates { token });
        }
        Ok(token)
    }
}
