use serde::{Deserialize, Serialize};

/// Configuration for prompt healing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealConfig {
    /// Additive logit bias applied to every candidate extension of a
    /// discarded token.
    pub extension_bias: f32,
    /// Extra bias on the literal original token, on top of
    /// `extension_bias`. Dampens over-aggressive rewrites such as
    /// `http` -> `https` when the original token was plausible; the model
    /// stays free to pick a better-fitting candidate.
    pub original_token_bias: f32,
    /// Strip leading/trailing whitespace before encoding the prompt.
    pub strip_prompt: bool,
    /// Sampling temperature for the constrained step; 0 means greedy.
    pub temperature: f64,
    /// Random seed for sampling.
    pub seed: u64,
}

impl Default for HealConfig {
    fn default() -> Self {
        Self {
            extension_bias: 10.0,
            original_token_bias: 1.0,
            strip_prompt: true,
            temperature: 0.0,
            seed: 42,
        }
    }
}

impl HealConfig {
    /// Strongly prefer keeping the original trailing tokens.
    pub fn conservative() -> Self {
        Self {
            original_token_bias: 5.0,
            ..Default::default()
        }
    }

    /// No preference for the original tokens; the model decides freely
    /// among all candidates.
    pub fn aggressive() -> Self {
        Self {
            original_token_bias: 0.0,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = HealConfig::default();
        assert_eq!(config.extension_bias, 10.0);
        assert_eq!(config.original_token_bias, 1.0);
        assert!(config.strip_prompt);
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = HealConfig::conservative();
        let json = serde_json::to_string(&config).unwrap();
        let back: HealConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.original_token_bias, 5.0);
    }
}
