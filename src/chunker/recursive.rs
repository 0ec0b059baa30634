//! Structure-aware recursive chunking over the separator cascade.

use super::separators::SEPARATOR_TIERS;

/// Split `text` by descending the separator cascade: paragraphs first, then
/// lines, sentences, clauses, words, and finally raw character windows.
/// Pieces are greedily packed into chunks of at most `chunk_size` characters
/// with an `overlap`-character carry between adjacent chunks; a piece too
/// large for any packing is re-split with the next, weaker tier.
pub fn chunk_recursive(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    split_at_tier(text, chunk_size, overlap, 0)
}

fn split_at_tier(text: &str, chunk_size: usize, overlap: usize, tier: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    // Small enough already: one chunk, no further descent.
    if text.chars().count() <= chunk_size {
        return vec![text.trim().to_string()];
    }

    for (idx, sep) in SEPARATOR_TIERS.iter().enumerate().skip(tier) {
        if sep.is_empty() {
            // No natural boundary left anywhere in the cascade.
            return chunk_by_size(text, chunk_size, overlap);
        }
        if text.contains(sep) {
            return pack_pieces(text, sep, chunk_size, overlap, idx);
        }
    }

    Vec::new()
}

/// Split on `sep` and greedily recombine the pieces into size-bounded
/// chunks. The separator stays attached to every piece except the last, so
/// concatenating the pieces reconstructs the input.
fn pack_pieces(
    text: &str,
    sep: &str,
    chunk_size: usize,
    overlap: usize,
    tier: usize,
) -> Vec<String> {
    let splits: Vec<&str> = text.split(sep).collect();
    let last = splits.len() - 1;

    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_chars = 0usize;

    for (i, split) in splits.iter().enumerate() {
        let piece = if i < last {
            format!("{split}{sep}")
        } else {
            (*split).to_string()
        };
        let piece_chars = piece.chars().count();

        // An oversized piece cannot be packed at this tier: flush whatever
        // is pending and break the piece with the next, weaker separator.
        // The tier index strictly increases, so this recursion is bounded.
        if piece_chars > chunk_size {
            flush(&mut chunks, &mut buffer);
            buffer_chars = 0;
            chunks.extend(split_at_tier(&piece, chunk_size, overlap, tier + 1));
            continue;
        }

        if buffer_chars + piece_chars > chunk_size && !buffer.is_empty() {
            // Carry the tail of the joined buffer into the next chunk, not
            // the tail of the last piece.
            let carry = tail_chars(&buffer, overlap);
            flush(&mut chunks, &mut buffer);
            buffer_chars = carry.chars().count();
            buffer = carry;
        }

        buffer.push_str(&piece);
        buffer_chars += piece_chars;
    }

    flush(&mut chunks, &mut buffer);
    chunks
}

fn flush(chunks: &mut Vec<String>, buffer: &mut String) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    buffer.clear();
}

/// Last `overlap` characters of `buffer`, or all of it when shorter.
fn tail_chars(buffer: &str, overlap: usize) -> String {
    if overlap == 0 {
        return String::new();
    }
    let skip = buffer.chars().count().saturating_sub(overlap);
    buffer.chars().skip(skip).collect()
}

/// Raw character windows: the recursion floor once every separator tier is
/// exhausted.
fn chunk_by_size(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let end = start + chunk_size;
        let chunk: String = chars[start..end.min(chars.len())].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}
