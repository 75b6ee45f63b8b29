use std::collections::HashMap;

use token_healer::{
    HealError, PromptTokenizer, Result, TokenizerLoader, TokenizerWrapper, VocabularyAdapter,
};

struct MapTokenizer {
    vocab: HashMap<String, u32>,
}

impl PromptTokenizer for MapTokenizer {
    fn encode(&self, _text: &str) -> Result<Vec<u32>> {
        unimplemented!("index construction only needs the vocabulary")
    }

    fn decode(&self, _ids: &[u32], _skip_special: bool) -> Result<String> {
        unimplemented!("index construction only needs the vocabulary")
    }

    fn token_piece(&self, _id: u32) -> Option<String> {
        None
    }

    fn vocab(&self) -> HashMap<String, u32> {
        self.vocab.clone()
    }
}

#[test]
fn test_index_from_tokenizer_vocabulary() {
    let vocab: HashMap<String, u32> = [("foo", 1u32), ("food", 2), ("bar", 3)]
        .into_iter()
        .map(|(piece, id)| (piece.to_string(), id))
        .collect();
    let tokenizer = MapTokenizer { vocab };

    let index = VocabularyAdapter::from_tokenizer(&tokenizer).unwrap();
    assert_eq!(index.len(), 3);
    assert_eq!(index.extensions("foo"), vec![1, 2]);
}

#[test]
fn test_index_from_json_file() {
    let path = std::env::temp_dir().join(format!("vocab_test_{}.json", std::process::id()));
    std::fs::write(&path, r#"{"foo": 1, "food": 2}"#).unwrap();

    let index = VocabularyAdapter::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(index.len(), 2);
    assert_eq!(index.extensions("foo").len(), 2);
}

#[test]
fn test_malformed_vocab_file_is_rejected() {
    let path = std::env::temp_dir().join(format!("vocab_bad_{}.json", std::process::id()));
    std::fs::write(&path, "not json").unwrap();

    let result = VocabularyAdapter::from_json_file(&path);
    std::fs::remove_file(&path).ok();

    assert!(matches!(result, Err(HealError::InvalidVocabulary(_))));
}

#[test]
fn test_missing_vocab_file_is_rejected() {
    let result = VocabularyAdapter::from_json_file("/nonexistent/vocab.json");
    assert!(matches!(result, Err(HealError::InvalidVocabulary(_))));
}

#[tokio::test]
async fn test_index_from_hub_tokenizer() {
    // Network-dependent; degrades to a skip when the Hub is unreachable.
    match TokenizerLoader::from_hf_hub("bert-base-uncased", None).await {
        Ok(tokenizer) => {
            let wrapper = TokenizerWrapper::new(tokenizer);
            let index = VocabularyAdapter::from_tokenizer(&wrapper).unwrap();
            assert!(index.len() > 1000, "BERT's vocabulary is large");
            assert!(
                !index.extensions("the").is_empty(),
                "a stored piece lists at least itself"
            );
        }
        Err(_) => eprintln!("Skipping integration test - couldn't load tokenizer"),
    }
}
