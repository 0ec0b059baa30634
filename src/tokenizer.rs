//! Tokenizer capability boundary.
//!
//! The engine never owns a tokenizer; callers inject one through this trait
//! and the dispatcher degrades to recursive chunking when none is supplied.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("encoding failed: {0}")]
    Encode(String),

    #[error("decoding failed: {0}")]
    Decode(String),
}

/// Injected tokenizer capability.
///
/// Implementations must be deterministic and side-effect free for a given
/// instance: encoding the same text twice yields the same ids, and decoding
/// an encoded window reproduces its text up to whitespace normalization.
pub trait Tokenizer: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError>;
    fn decode(&self, ids: &[u32]) -> Result<String, TokenizerError>;
}

/// Whitespace word tokenizer with an interned vocabulary. One id per
/// distinct word, assigned in encounter order; decode joins words with
/// single spaces. Good enough for offline runs and tests -- a model-matched
/// tokenizer should be injected for production embedding pipelines.
#[derive(Default)]
pub struct WordTokenizer {
    vocab: Mutex<Vocab>,
}

#[derive(Default)]
struct Vocab {
    ids: HashMap<String, u32>,
    words: Vec<String>,
}

impl WordTokenizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Vocab {
    fn intern(&mut self, word: &str) -> u32 {
        if let Some(&id) = self.ids.get(word) {
            return id;
        }
        let id = self.words.len() as u32;
        self.ids.insert(word.to_string(), id);
        self.words.push(word.to_string());
        id
    }
}

impl Tokenizer for WordTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        let mut vocab = self
            .vocab
            .lock()
            .map_err(|_| TokenizerError::Encode("vocabulary lock poisoned".into()))?;
        Ok(text
            .split_whitespace()
            .map(|word| vocab.intern(word))
            .collect())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, TokenizerError> {
        let vocab = self
            .vocab
            .lock()
            .map_err(|_| TokenizerError::Decode("vocabulary lock poisoned".into()))?;
        let words = ids
            .iter()
            .map(|&id| {
                vocab
                    .words
                    .get(id as usize)
                    .map(|w| w.as_str())
                    .ok_or_else(|| TokenizerError::Decode(format!("unknown token id {id}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let tokenizer = WordTokenizer::default();
        let ids = tokenizer.encode("the quick brown fox").unwrap();
        assert_eq!(ids.len(), 4);
        assert_eq!(tokenizer.decode(&ids).unwrap(), "the quick brown fox");
    }

    #[test]
    fn test_repeated_words_share_ids() {
        let tokenizer = WordTokenizer::default();
        let ids = tokenizer.encode("a b a b a").unwrap();
        assert_eq!(ids, vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_unknown_id_fails_decode() {
        let tokenizer = WordTokenizer::default();
        assert!(tokenizer.decode(&[99]).is_err());
    }

    #[test]
    fn test_encode_deterministic() {
        let tokenizer = WordTokenizer::default();
        let first = tokenizer.encode("same text both times").unwrap();
        let second = tokenizer.encode("same text both times").unwrap();
        assert_eq!(first, second);
    }
}
