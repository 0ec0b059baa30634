//! Fixed-width sliding window with word-boundary snapping.

use super::MIN_CHUNK_RATIO;

/// Split `text` into windows of `chunk_size` characters with `overlap`
/// characters repeated between adjacent windows.
///
/// When the right edge of a window lands inside a word, the boundary is
/// retracted to the last space in the window, provided that space sits past
/// `chunk_size * MIN_CHUNK_RATIO` -- a cut that early would produce a
/// degenerate chunk, so mid-word cuts are accepted instead.
pub fn chunk_fixed(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let min_cut = (chunk_size as f64 * MIN_CHUNK_RATIO) as usize;

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < total {
        // The nominal edge may overrun the text; slicing below caps it, but
        // the cursor advance uses the nominal edge so the final window does
        // not re-emit its own tail.
        let mut end = start + chunk_size;

        // Snap back to a word boundary if the edge falls mid-word.
        if end < total && !chars[end].is_whitespace() {
            let window = &chars[start..end];
            if let Some(last_space) = window.iter().rposition(|c| *c == ' ') {
                if last_space > min_cut {
                    end = start + last_space;
                }
            }
        }

        let chunk: String = chars[start..end.min(total)].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        // Overlap may never push the cursor backwards: snapping can shorten
        // a window below the overlap, so force at least one char of progress.
        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        assert!(chunk_fixed("", 100, 10).is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk_fixed("hello world", 100, 10);
        assert_eq!(chunks, vec!["hello world"]);
    }

    #[test]
    fn test_windows_overlap() {
        // No spaces, so no snapping: pure windows of 10 advancing by 8.
        let text = "a".repeat(26);
        let chunks = chunk_fixed(&text, 10, 2);
        assert_eq!(chunks[0].len(), 10);
        assert_eq!(chunks[1].len(), 10);
        // 0..10, 8..18, 16..26 -- then start = 24, final tail 24..26.
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[3].len(), 2);
    }

    #[test]
    fn test_snaps_to_word_boundary() {
        let chunks = chunk_fixed("The quick brown fox jumps", 10, 2);
        // First window is 10 chars ending inside "brown"; the last space at
        // offset 9 is past 10 * 0.7, so the cut retracts to it.
        assert_eq!(chunks[0], "The quick");
        for chunk in &chunks {
            assert!(!chunk.trim().is_empty());
        }
    }

    #[test]
    fn test_no_snap_when_space_too_early() {
        // Single leading space at offset 1, far below 20 * 0.7 = 14.
        let text = format!("a {}", "b".repeat(40));
        let chunks = chunk_fixed(&text, 20, 0);
        assert_eq!(chunks[0].chars().count(), 20);
    }

    #[test]
    fn test_whitespace_only_windows_dropped() {
        let text = format!("word{}word", " ".repeat(30));
        let chunks = chunk_fixed(&text, 10, 0);
        for chunk in &chunks {
            assert!(!chunk.trim().is_empty());
        }
    }

    #[test]
    fn test_terminates_with_large_overlap() {
        // overlap close to chunk_size plus snapping used to regress the
        // cursor; the progress clamp keeps this finite.
        let text = "one two three four five six seven eight nine ten ".repeat(5);
        let chunks = chunk_fixed(&text, 10, 8);
        assert!(!chunks.is_empty());
        assert!(chunks.len() < text.len());
    }

    #[test]
    fn test_reassembly_preserves_content() {
        // With zero overlap and short words every cut snaps to a space, so
        // joining the chunks must reproduce the source modulo whitespace
        // collapsed at the cut points.
        let text = "Alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let chunks = chunk_fixed(text, 18, 0);
        assert!(chunks.len() > 1);
        let rebuilt = chunks.join(" ");
        let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(normalize(&rebuilt), normalize(text));
    }

    #[test]
    fn test_multibyte_text() {
        let text = "héllo wörld çafé ünïcode tëst dàta hérë ågain ".repeat(3);
        let chunks = chunk_fixed(&text, 15, 3);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 15);
        }
    }
}
