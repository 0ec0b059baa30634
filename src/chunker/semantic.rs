//! Semantic-break chunking: split where consecutive sentence embeddings
//! diverge.

use crate::embedder::{EmbedError, Embedder};
use crate::similarity::cosine_distance;

/// Split `text` at topic shifts. Sentences are embedded individually, the
/// cosine distance between each consecutive pair is compared against the
/// mean, and a breakpoint is declared wherever
/// `distance > mean * (1 + threshold)`. Spans that still exceed `max_size`
/// are re-packed sentence by sentence; sentences are atomic at that level,
/// so an oversized single sentence is emitted whole rather than truncated.
pub(crate) fn chunk_semantic(
    text: &str,
    max_size: usize,
    threshold: f32,
    embedder: &dyn Embedder,
) -> Result<Vec<String>, EmbedError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let sentences = split_sentences(text);
    if sentences.len() <= 1 {
        return Ok(vec![trimmed.to_string()]);
    }

    let embeddings = embedder.embed(&sentences)?;

    let distances: Vec<f32> = embeddings
        .windows(2)
        .map(|pair| cosine_distance(&pair[0], &pair[1]))
        .collect();
    let mean = distances.iter().sum::<f32>() / distances.len() as f32;

    // Start and end are always breakpoints; interior ones need a distance
    // clearly above the mean. Uniform text never clears the bar and stays
    // one span.
    let mut breakpoints = vec![0usize];
    for (i, distance) in distances.iter().enumerate() {
        if *distance > mean * (1.0 + threshold) {
            breakpoints.push(i + 1);
        }
    }
    breakpoints.push(sentences.len());

    let mut chunks = Vec::new();
    for bounds in breakpoints.windows(2) {
        let span = &sentences[bounds[0]..bounds[1]];
        let joined = span.join(" ");
        if joined.chars().count() > max_size {
            chunks.extend(pack_sentences(span, max_size));
        } else {
            let joined = joined.trim();
            if !joined.is_empty() {
                chunks.push(joined.to_string());
            }
        }
    }

    Ok(chunks)
}

/// Greedily pack sentences into chunks of at most `max_size` characters.
/// No overlap carry here -- sentences are the atomic unit.
fn pack_sentences(sentences: &[String], max_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for sentence in sentences {
        let sentence_len = sentence.chars().count();
        if current_len + sentence_len > max_size && !current.is_empty() {
            chunks.push(current.join(" "));
            current.clear();
            current_len = 0;
        }
        current.push(sentence);
        current_len += sentence_len + 1; // joining space
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    chunks
}

/// Split text into sentences. A sentence ends at `.`/`!`/`?` followed by
/// whitespace and then an uppercase letter; Unicode uppercase, so accented
/// capitals open a sentence too.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        if matches!(chars[i], '.' | '!' | '?') {
            let mut next = i + 1;
            while next < chars.len() && chars[next].is_whitespace() {
                next += 1;
            }
            if next > i + 1 && next < chars.len() && chars[next].is_uppercase() {
                let sentence: String = chars[start..=i].iter().collect();
                let sentence = sentence.trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                start = next;
                i = next;
                continue;
            }
        }
        i += 1;
    }

    let tail: String = chars[start..].iter().collect();
    let tail = tail.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}
