use std::collections::HashMap;

use candle_core::{Result as CandleResult, Tensor};
use candle_transformers::generation::LogitsProcessor;
use rand::{rngs::StdRng, SeedableRng};

use crate::healing::HealConfig;

/// Logits-space mechanics of one constrained decoding step.
pub struct ConstrainedStep {
    #[allow(dead_code)]
    rng: StdRng,
    logits_processor: LogitsProcessor,
}

impl ConstrainedStep {
    pub fn new(seed: u64, temperature: Option<f64>) -> Self {
        let logits_processor = LogitsProcessor::new(seed, temperature, None);

        Self {
            rng: StdRng::seed_from_u64(seed),
            logits_processor,
        }
    }

    pub fn from_config(config: &HealConfig) -> Self {
        let temperature = (config.temperature > 0.0).then_some(config.temperature);
        Self::new(config.seed, temperature)
    }

    /// Restrict `logits` to the candidate set and apply the bias map.
    ///
    /// Every id outside `allowed` is masked to negative infinity; each
    /// allowed id gets its bias added. The bias orders candidates, the
    /// mask excludes everything else.
    pub fn constrain_logits(
        &self,
        logits: &Tensor,
        allowed: &[u32],
        bias: &HashMap<u32, f32>,
    ) -> CandleResult<Tensor> {
        let device = logits.device();
        let vocab_size = logits.dims1()?;
        let source = logits.to_vec1::<f32>()?;

        let mut constrained = vec![f32::NEG_INFINITY; vocab_size];
        for &id in allowed {
            let idx = id as usize;
            if idx < vocab_size {
                constrained[idx] = source[idx] + bias.get(&id).copied().unwrap_or(0.0);
            }
        }

        Tensor::from_vec(constrained, vocab_size, device)
    }

    /// Sample the next token from (already constrained) logits.
    pub fn sample(&mut self, logits: &Tensor) -> CandleResult<u32> {
        self.logits_processor.sample(logits)
    }
}
