//! Prompt boundary healing for greedy subword tokenizers.
//!
//! When a prompt is cut at an arbitrary character boundary, greedy
//! tokenization can encode the trailing characters into a token that is
//! a strict prefix of other, more specific vocabulary entries (e.g.
//! `"http:"` becoming the token `http:` instead of letting the model
//! choose between `http://` and `https://`), biasing generation toward
//! the wrong continuation. [`TokenHealer`] detects the condition, trims
//! the ambiguous trailing tokens and regenerates them one at a time
//! under a candidate-set constraint drawn from a [`VocabularyIndex`]
//! built once over the tokenizer's vocabulary.

pub mod error;
pub mod healing;
pub mod llm;
pub mod tokenizer;
pub mod vocab;

pub use error::{HealError, Result};
pub use healing::{BoundaryScan, HealConfig, TokenHealer};
pub use llm::{ConstrainedGenerator, GgufGenerator};
pub use tokenizer::{PromptTokenizer, TokenizerLoader, TokenizerWrapper};
pub use vocab::{VocabularyAdapter, VocabularyIndex};
