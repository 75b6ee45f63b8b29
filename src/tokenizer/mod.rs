use std::collections::HashMap;

use tokenizers::Tokenizer;

use crate::error::{HealError, Result};

pub mod loader;

pub use loader::TokenizerLoader;

/// The tokenizer capabilities healing needs.
///
/// `encode` must be deterministic and insert no special tokens; `decode`
/// must round-trip with `encode` for text composed purely of vocabulary
/// tokens. `token_piece` returns the raw vocabulary string for an id,
/// whitespace markers (`Ġ`, `▁`, ...) intact; prefix queries run against
/// these pieces so marker conventions always match the index keys.
pub trait PromptTokenizer: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    fn decode(&self, ids: &[u32], skip_special: bool) -> Result<String>;

    /// Raw vocabulary piece for a single id, `None` if the id is unknown.
    fn token_piece(&self, id: u32) -> Option<String>;

    /// The complete, finite vocabulary.
    fn vocab(&self) -> HashMap<String, u32>;
}

/// Thin wrapper over a HuggingFace `tokenizers::Tokenizer`.
#[derive(Debug, Clone)]
pub struct TokenizerWrapper {
    tokenizer: Tokenizer,
}

impl TokenizerWrapper {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    pub fn inner(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }
}

impl PromptTokenizer for TokenizerWrapper {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        self.tokenizer
            .encode(text, false)
            .map(|encoding| encoding.get_ids().to_vec())
            .map_err(|e| HealError::Tokenizer(e.to_string()))
    }

    fn decode(&self, ids: &[u32], skip_special: bool) -> Result<String> {
        self.tokenizer
            .decode(ids, skip_special)
            .map_err(|e| HealError::Tokenizer(e.to_string()))
    }

    fn token_piece(&self, id: u32) -> Option<String> {
        self.tokenizer.id_to_token(id)
    }

    fn vocab(&self) -> HashMap<String, u32> {
        self.tokenizer.get_vocab(true)
    }
}
