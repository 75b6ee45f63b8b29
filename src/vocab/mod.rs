/// Vocabulary indexing for prefix-extension queries.
///
/// This module answers the question at the heart of boundary healing:
/// "how many vocabulary entries extend this string, and which ones?"

pub mod adapter;
pub mod trie;

pub use adapter::VocabularyAdapter;
pub use trie::VocabularyIndex;
