use thiserror::Error;

pub type Result<T> = std::result::Result<T, HealError>;

/// Errors surfaced by prompt healing.
///
/// Scanning and trimming never fail on well-formed input; only index
/// construction and the regeneration phase produce errors.
#[derive(Debug, Error)]
pub enum HealError {
    /// The vocabulary handed to `VocabularyIndex::build` had no entries.
    /// A zero-entry index cannot answer prefix queries, so this is a
    /// configuration error at construction time, never a runtime one.
    #[error("vocabulary contains no entries")]
    EmptyVocabulary,

    /// A vocabulary file could not be read or parsed.
    #[error("invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    /// The underlying tokenizer reported an error.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// The generation backend failed; the caller should keep the
    /// original prompt.
    #[error("generation failed: {0}")]
    Generation(#[from] candle_core::Error),

    /// The generation backend returned a token id that was not in the
    /// allowed candidate set.
    #[error("generated token {token} is outside the allowed candidate set")]
    TokenOutsideCandidates { token: u32 },
}
