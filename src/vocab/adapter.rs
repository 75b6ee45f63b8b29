use std::collections::HashMap;
use std::path::Path;

use crate::error::{HealError, Result};
use crate::tokenizer::PromptTokenizer;
use crate::vocab::VocabularyIndex;

/// Builds a `VocabularyIndex` from the places a vocabulary lives.
pub struct VocabularyAdapter;

impl VocabularyAdapter {
    /// Index a tokenizer's complete symbol table.
    ///
    /// # Arguments
    /// * `tokenizer` - The tokenizer to extract the vocabulary from
    ///
    /// # Returns
    /// An index ready for prefix-extension queries during healing.
    pub fn from_tokenizer<T: PromptTokenizer + ?Sized>(tokenizer: &T) -> Result<VocabularyIndex> {
        VocabularyIndex::build(&tokenizer.vocab())
    }

    /// Index a plain `{"piece": id}` JSON file.
    ///
    /// Useful for offline construction when no tokenizer object is at
    /// hand (e.g. a dumped `vocab.json`).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<VocabularyIndex> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| HealError::InvalidVocabulary(format!("{}: {e}", path.display())))?;
        let entries: HashMap<String, u32> = serde_json::from_str(&content)
            .map_err(|e| HealError::InvalidVocabulary(format!("{}: {e}", path.display())))?;
        VocabularyIndex::build(&entries)
    }
}
