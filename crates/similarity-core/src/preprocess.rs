//! Text normalization applied before embedding
//!
//! Queries and corpus entries must go through the same preprocessor, otherwise
//! their vectors are not comparable.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Runs of anything that is not a letter or digit
    static ref NON_ALPHANUMERIC: Regex = Regex::new(r"[^\p{L}\p{N}]+").unwrap();

    /// Common English function words that carry little meaning for matching
    static ref STOPWORDS: HashSet<&'static str> = [
        "a", "about", "above", "after", "again", "against", "all", "am", "an", "and",
        "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
        "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing",
        "down", "during", "each", "few", "for", "from", "further", "had", "has", "have",
        "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "i",
        "if", "in", "into", "is", "it", "its", "itself", "just", "me", "more", "most",
        "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
        "or", "other", "our", "ours", "ourselves", "out", "over", "own", "s", "same",
        "she", "should", "so", "some", "such", "t", "than", "that", "the", "their",
        "theirs", "them", "themselves", "then", "there", "these", "they", "this",
        "those", "through", "to", "too", "under", "until", "up", "very", "was", "we",
        "were", "will", "with", "would", "you", "your", "yours", "yourself",
        "yourselves",
    ]
    .into_iter()
    .collect();
}

/// Normalizes raw text into the form that gets embedded
pub trait Preprocessor: Send + Sync {
    fn preprocess(&self, text: &str) -> String;
}

/// Lowercases, strips punctuation, collapses whitespace and optionally
/// drops English stopwords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPreprocessor {
    remove_stopwords: bool,
}

impl TextPreprocessor {
    pub fn new(remove_stopwords: bool) -> Self {
        Self { remove_stopwords }
    }

    pub fn removes_stopwords(&self) -> bool {
        self.remove_stopwords
    }
}

impl Default for TextPreprocessor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Preprocessor for TextPreprocessor {
    fn preprocess(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let cleaned = NON_ALPHANUMERIC.replace_all(&lowered, " ");

        cleaned
            .split_whitespace()
            .filter(|word| !(self.remove_stopwords && STOPWORDS.contains(word)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Passes text through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Preprocessor for Identity {
    fn preprocess(&self, text: &str) -> String {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lowercase_and_punctuation() {
        let p = TextPreprocessor::new(false);
        assert_eq!(
            p.preprocess("What's the BEST way to learn Rust?!"),
            "what s the best way to learn rust"
        );
    }

    #[test]
    fn test_stopword_removal() {
        let p = TextPreprocessor::default();
        assert_eq!(
            p.preprocess("What is the best way to learn Rust?"),
            "what best way learn rust"
        );
    }

    #[test]
    fn test_collapses_whitespace() {
        let p = TextPreprocessor::new(false);
        assert_eq!(p.preprocess("  cat \t sat\n\non   mat  "), "cat sat on mat");
        assert_eq!(p.preprocess("   "), "");
    }

    #[test]
    fn test_idempotent() {
        let p = TextPreprocessor::default();
        let once = p.preprocess("How do I become a better programmer, quickly?");
        assert_eq!(p.preprocess(&once), once);
    }

    #[test]
    fn test_keeps_digits_and_unicode_letters() {
        let p = TextPreprocessor::new(false);
        assert_eq!(p.preprocess("Café No. 5"), "café no 5");
    }

    #[test]
    fn test_identity() {
        assert_eq!(Identity.preprocess("Keep  As-Is"), "Keep  As-Is");
    }
}
