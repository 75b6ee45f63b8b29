use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{HealError, Result};
use crate::healing::scanner::{scan_boundary, DiscardedToken, PromptToken};
use crate::healing::HealConfig;
use crate::llm::ConstrainedGenerator;
use crate::tokenizer::PromptTokenizer;
use crate::vocab::{VocabularyAdapter, VocabularyIndex};

/// End-to-end prompt healer.
///
/// Owns a tokenizer, a generation backend and a read-only
/// `VocabularyIndex` built from the tokenizer's vocabulary. The index is
/// held behind an `Arc` so several healers (one per thread, each with
/// its own backend) can share a single build.
pub struct TokenHealer<T, G> {
    tokenizer: T,
    generator: G,
    index: Arc<VocabularyIndex>,
    config: HealConfig,
}

impl<T, G> TokenHealer<T, G>
where
    T: PromptTokenizer,
    G: ConstrainedGenerator,
{
    /// Build a healer, indexing the tokenizer's vocabulary.
    ///
    /// Fails only if the vocabulary is empty (a configuration error).
    pub fn new(tokenizer: T, generator: G, config: HealConfig) -> Result<Self> {
        let index = Arc::new(VocabularyAdapter::from_tokenizer(&tokenizer)?);
        Ok(Self::with_index(tokenizer, generator, index, config))
    }

    /// Build a healer around an already-built, shared index.
    pub fn with_index(
        tokenizer: T,
        generator: G,
        index: Arc<VocabularyIndex>,
        config: HealConfig,
    ) -> Self {
        Self {
            tokenizer,
            generator,
            index,
            config,
        }
    }

    /// The shared vocabulary index, for constructing sibling healers.
    pub fn index(&self) -> &Arc<VocabularyIndex> {
        &self.index
    }

    pub fn config(&self) -> &HealConfig {
        &self.config
    }

    /// Heal the trailing token boundary of `prompt`.
    ///
    /// Returns the prompt unchanged when its trailing run is
    /// unambiguous. On a generation failure the error is returned and no
    /// partially rewritten string is ever produced; see
    /// [`heal_or_keep`](Self::heal_or_keep) for the safe fallback.
    pub fn heal(&mut self, prompt: &str) -> Result<String> {
        if prompt.is_empty() {
            return Ok(String::new());
        }
        let text = if self.config.strip_prompt {
            prompt.trim()
        } else {
            prompt
        };
        let ids = self.tokenizer.encode(text)?;
        if ids.is_empty() {
            return Ok(prompt.to_string());
        }

        let run = self.token_run(&ids)?;
        let scan = scan_boundary(&run, &self.index);
        if scan.is_clean() {
            return Ok(prompt.to_string());
        }

        // When every token was discarded the prefix is empty and the
        // backend regenerates from its start-of-sequence context.
        let sequence = self.regenerate(ids[..scan.keep].to_vec(), &scan.discarded)?;
        self.tokenizer.decode(&sequence, true)
    }

    /// Like [`heal`](Self::heal), but hands back the original prompt on
    /// failure. Healing failures are non-fatal to the surrounding
    /// workflow: the original prompt remains usable.
    pub fn heal_or_keep(&mut self, prompt: &str) -> String {
        match self.heal(prompt) {
            Ok(healed) => healed,
            Err(err) => {
                tracing::warn!(%err, "healing failed, keeping original prompt");
                prompt.to_string()
            }
        }
    }

    /// One constrained generation step per discarded token, oldest
    /// first. Each chosen id is appended before the next step, so later
    /// positions regenerate with full knowledge of earlier corrections.
    pub(super) fn regenerate(
        &mut self,
        mut sequence: Vec<u32>,
        discarded: &[DiscardedToken],
    ) -> Result<Vec<u32>> {
        for token in discarded {
            if token.candidates.is_empty() {
                // Exhausted candidate set: keep the literal token rather
                // than produce an invalid sequence.
                tracing::warn!(token = token.id, "empty candidate set, keeping original token");
                sequence.push(token.id);
                continue;
            }

            let mut bias: HashMap<u32, f32> = token
                .candidates
                .iter()
                .map(|&id| (id, self.config.extension_bias))
                .collect();
            if let Some(weight) = bias.get_mut(&token.id) {
                *weight += self.config.original_token_bias;
            }

            let chosen = self
                .generator
                .generate_one(&sequence, &token.candidates, &bias)?;
            if !token.candidates.contains(&chosen) {
                return Err(HealError::TokenOutsideCandidates { token: chosen });
            }
            tracing::debug!(original = token.id, chosen, "regenerated boundary token");
            sequence.push(chosen);
        }
        Ok(sequence)
    }

    fn token_run(&self, ids: &[u32]) -> Result<Vec<PromptToken>> {
        ids.iter()
            .map(|&id| {
                let piece = self.tokenizer.token_piece(id).unwrap_or_default();
                let content = self.tokenizer.decode(&[id], true)?;
                Ok(PromptToken { id, piece, content })
            })
            .collect()
    }
}
