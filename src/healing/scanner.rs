use crate::vocab::VocabularyIndex;

/// One token of a tokenized prompt, as the scanner sees it.
///
/// `piece` is the raw vocabulary string for the id (whitespace markers
/// intact); `content` is the id decoded with special tokens skipped.
#[derive(Debug, Clone)]
pub struct PromptToken {
    pub id: u32,
    pub piece: String,
    pub content: String,
}

/// A trailing token discarded by the scan, with the vocabulary entries
/// that extend it.
#[derive(Debug, Clone)]
pub struct DiscardedToken {
    pub id: u32,
    pub piece: String,
    pub candidates: Vec<u32>,
}

/// Result of scanning a prompt's trailing token run.
#[derive(Debug, Clone)]
pub struct BoundaryScan {
    /// Length of the safe prefix: the discard run starts at this index.
    pub keep: usize,
    /// Discarded tokens, oldest first.
    pub discarded: Vec<DiscardedToken>,
}

impl BoundaryScan {
    /// True when nothing needs healing, which is the common case.
    pub fn is_clean(&self) -> bool {
        self.discarded.is_empty()
    }
}

/// Determine the run of trailing tokens that are ambiguous prefixes.
///
/// Walks the run backward from the last token. Tokens whose decoded
/// content is empty carry no literal text (control tokens) and are
/// passed over, never discarded. A token is ambiguous when strictly more
/// than one vocabulary entry extends its piece; the walk stops at the
/// first token that is not. A fully ambiguous run is discarded down to
/// and including the very first token.
pub fn scan_boundary(run: &[PromptToken], index: &VocabularyIndex) -> BoundaryScan {
    let mut keep = run.len();
    let mut discarded = Vec::new();

    for (i, token) in run.iter().enumerate().rev() {
        if token.content.is_empty() {
            continue;
        }
        let candidates = index.extensions(&token.piece);
        if candidates.len() > 1 {
            discarded.push(DiscardedToken {
                id: token.id,
                piece: token.piece.clone(),
                candidates,
            });
            keep = i;
        } else {
            break;
        }
    }

    discarded.reverse();
    if !discarded.is_empty() {
        tracing::debug!(count = discarded.len(), keep, "ambiguous trailing run");
    }
    BoundaryScan { keep, discarded }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn index_of(pieces: &[(&str, u32)]) -> VocabularyIndex {
        let entries: HashMap<String, u32> = pieces
            .iter()
            .map(|&(piece, id)| (piece.to_string(), id))
            .collect();
        VocabularyIndex::build(&entries).expect("non-empty vocabulary")
    }

    fn token(id: u32, piece: &str, content: &str) -> PromptToken {
        PromptToken {
            id,
            piece: piece.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_empty_run_has_no_discards() {
        let index = index_of(&[("a", 0)]);
        let scan = scan_boundary(&[], &index);
        assert!(scan.is_clean());
        assert_eq!(scan.keep, 0);
    }

    #[test]
    fn test_all_control_tokens_discard_nothing() {
        let index = index_of(&[("a", 0), ("ab", 1)]);
        let run = vec![token(9, "<s>", ""), token(9, "<s>", "")];
        let scan = scan_boundary(&run, &index);
        assert!(scan.is_clean());
        assert_eq!(scan.keep, 2);
    }

    #[test]
    fn test_trailing_control_token_is_passed_over() {
        let index = index_of(&[("a", 0), ("ab", 1), ("x", 2)]);
        // Ambiguous "a" sits behind a no-content control token.
        let run = vec![token(2, "x", "x"), token(0, "a", "a"), token(9, "<s>", "")];
        let scan = scan_boundary(&run, &index);
        assert_eq!(scan.keep, 1);
        assert_eq!(scan.discarded.len(), 1);
        assert_eq!(scan.discarded[0].id, 0);
        assert_eq!(scan.discarded[0].candidates, vec![0, 1]);
    }

    #[test]
    fn test_stops_at_first_unambiguous_token() {
        let index = index_of(&[("a", 0), ("ab", 1), ("x", 2)]);
        // "a" is ambiguous but precedes the unambiguous "x": interior
        // tokens are never revisited.
        let run = vec![token(0, "a", "a"), token(2, "x", "x")];
        let scan = scan_boundary(&run, &index);
        assert!(scan.is_clean());
        assert_eq!(scan.keep, 2);
    }

    #[test]
    fn test_fully_ambiguous_run_discards_the_first_token_too() {
        let index = index_of(&[("a", 0), ("ab", 1), ("b", 2), ("ba", 3)]);
        let run = vec![token(0, "a", "a"), token(2, "b", "b")];
        let scan = scan_boundary(&run, &index);
        assert_eq!(scan.keep, 0);
        let ids: Vec<u32> = scan.discarded.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 2], "discard run must be oldest first");
    }

    #[test]
    fn test_unknown_piece_is_not_ambiguous() {
        let index = index_of(&[("a", 0), ("ab", 1)]);
        let run = vec![token(7, "zz", "zz")];
        let scan = scan_boundary(&run, &index);
        assert!(scan.is_clean());
    }
}
