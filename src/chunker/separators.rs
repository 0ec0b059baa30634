/// Separator tiers ordered from most to least structured: paragraph breaks,
/// line breaks, sentence terminators (marker kept with its punctuation),
/// clause separators, then word boundaries. The final empty marker means no
/// natural boundary is left and the text falls through to raw character
/// windows.
///
/// The recursive strategy walks this table by index; recursing into an
/// oversized piece always starts at the next tier, so the index strictly
/// increases and the terminal tier bounds the recursion.
pub const SEPARATOR_TIERS: &[&str] = &[
    "\n\n", // paragraphs
    "\n",   // lines
    ". ",   // sentences
    "! ",
    "? ",
    "; ",   // clauses
    ", ",
    " ",    // words
    "",     // characters (last resort)
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_tier_is_empty() {
        assert_eq!(SEPARATOR_TIERS.last(), Some(&""));
    }

    #[test]
    fn test_paragraphs_before_words() {
        let para = SEPARATOR_TIERS.iter().position(|s| *s == "\n\n");
        let word = SEPARATOR_TIERS.iter().position(|s| *s == " ");
        assert!(para < word);
    }
}
