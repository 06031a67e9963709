//! Comment content screening.
//!
//! Small synchronous word-list check applied before a comment is persisted.
//! Matching is case-insensitive and on whole words only, so ordinary words
//! that merely contain a banned term pass.

const BANNED_WORDS: &[&str] = &[
    "fuck", "shit", "bitch", "asshole", "bastard", "dickhead", "scam",
];

/// True when `content` contains a banned word.
pub fn contains_banned_word(content: &str) -> bool {
    content
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| BANNED_WORDS.contains(&word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_banned_words_regardless_of_case() {
        assert!(contains_banned_word("this is a SCAM"));
        assert!(contains_banned_word("Shit, sorry"));
    }

    #[test]
    fn matches_whole_words_only() {
        assert!(!contains_banned_word("scampi is a dish"));
        assert!(!contains_banned_word("classic assessment"));
    }

    #[test]
    fn clean_content_passes() {
        assert!(!contains_banned_word("great resume, clear layout"));
        assert!(!contains_banned_word(""));
    }

    #[test]
    fn punctuation_does_not_hide_banned_words() {
        assert!(contains_banned_word("what a scam!"));
        assert!(contains_banned_word("scam,really"));
    }
}
