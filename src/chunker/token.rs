//! Token-budget chunking over an injected tokenizer capability.

use tracing::warn;

use super::{CHARS_PER_TOKEN, MIN_CHUNK_TOKENS, MIN_OVERLAP_TOKENS};
use crate::tokenizer::{Tokenizer, TokenizerError};

/// Convert a character budget into a token budget using the ~4 chars/token
/// heuristic, with floors that keep chunks from degenerating.
pub(crate) fn token_budget(chunk_size: usize, overlap: usize) -> (usize, usize) {
    let max_tokens = (chunk_size / CHARS_PER_TOKEN).max(MIN_CHUNK_TOKENS);
    let overlap_tokens = (overlap / CHARS_PER_TOKEN).max(MIN_OVERLAP_TOKENS);
    (max_tokens, overlap_tokens)
}

/// Window the token-id sequence like the fixed chunker windows characters,
/// decoding each window back to text.
///
/// An encode failure bubbles up so the dispatcher can fall back to the
/// recursive strategy; a decode failure on a single window only skips that
/// window's output.
pub(crate) fn chunk_tokens(
    text: &str,
    max_tokens: usize,
    overlap_tokens: usize,
    tokenizer: &dyn Tokenizer,
) -> Result<Vec<String>, TokenizerError> {
    let overlap_tokens = if overlap_tokens >= max_tokens {
        max_tokens / 4
    } else {
        overlap_tokens
    };

    let tokens = tokenizer.encode(text)?;
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < tokens.len() {
        let end = start + max_tokens;
        let window = &tokens[start..end.min(tokens.len())];

        match tokenizer.decode(window) {
            Ok(decoded) => {
                let decoded = decoded.trim();
                if !decoded.is_empty() {
                    chunks.push(decoded.to_string());
                }
            }
            Err(err) => {
                // One bad window must not abort the document.
                warn!(error = %err, "skipping token window that failed to decode");
            }
        }

        if end >= tokens.len() {
            break;
        }
        start = end - overlap_tokens;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::WordTokenizer;

    #[test]
    fn test_budget_conversion() {
        assert_eq!(token_budget(500, 50), (125, 12));
        // Floors kick in for tiny budgets.
        assert_eq!(token_budget(40, 4), (50, 10));
    }

    #[test]
    fn test_short_text_single_chunk() {
        let tokenizer = WordTokenizer::default();
        let chunks = chunk_tokens("a few words here", 50, 10, &tokenizer).unwrap();
        assert_eq!(chunks, vec!["a few words here"]);
    }

    #[test]
    fn test_windows_with_overlap() {
        let tokenizer = WordTokenizer::default();
        let text = "w0 w1 w2 w3 w4 w5 w6 w7 w8 w9";
        let chunks = chunk_tokens(text, 4, 2, &tokenizer).unwrap();
        assert_eq!(chunks[0], "w0 w1 w2 w3");
        assert_eq!(chunks[1], "w2 w3 w4 w5");
        assert_eq!(chunks.last().unwrap(), "w6 w7 w8 w9");
    }

    #[test]
    fn test_overlap_clamped_below_window() {
        let tokenizer = WordTokenizer::default();
        let text = "a b c d e f g h";
        // overlap >= window clamps to window / 4 = 1, so this terminates.
        let chunks = chunk_tokens(text, 4, 7, &tokenizer).unwrap();
        assert!(chunks.len() > 1);
    }

    #[test]
    fn test_empty_text() {
        let tokenizer = WordTokenizer::default();
        assert!(chunk_tokens("", 50, 10, &tokenizer).unwrap().is_empty());
    }

    /// Delegates to a word tokenizer but refuses to decode any window
    /// containing one poisoned id.
    struct PoisonedDecoder {
        inner: WordTokenizer,
        poison: u32,
    }

    impl Tokenizer for PoisonedDecoder {
        fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
            self.inner.encode(text)
        }

        fn decode(&self, ids: &[u32]) -> Result<String, TokenizerError> {
            if ids.contains(&self.poison) {
                return Err(TokenizerError::Decode("poisoned id".into()));
            }
            self.inner.decode(ids)
        }
    }

    #[test]
    fn test_decode_failure_skips_only_that_window() {
        // Windows of 3 over 8 ids: [0,1,2], [3,4,5], [6,7]. The middle one
        // fails to decode; the document must not abort and both neighbors
        // must survive.
        let tokenizer = PoisonedDecoder {
            inner: WordTokenizer::default(),
            poison: 3,
        };
        let chunks = chunk_tokens("a b c d e f g h", 3, 0, &tokenizer).unwrap();
        assert_eq!(chunks, vec!["a b c", "g h"]);
    }
}
