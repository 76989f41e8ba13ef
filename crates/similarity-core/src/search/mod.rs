//! Brute-force cosine similarity retrieval
//!
//! - `find_similar`, the top-N cosine similarity scan
//! - `SimilarityRetriever`, a validated corpus + matrix pair
//! - `EmbeddedCorpus`, an embedder bound to its retriever for text queries

pub mod text;
pub mod vector;

pub use text::{EmbeddedCorpus, TextSearch};
pub use vector::{cosine_similarity, find_similar, SimilarityRetriever};

use serde::Serialize;

/// Number of results returned when the caller does not ask for a specific count
pub const DEFAULT_TOP_N: usize = 5;

/// One ranked corpus entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarMatch<'a> {
    /// Position in the corpus (and row in the embedding matrix)
    pub index: usize,
    pub text: &'a str,
    /// Cosine similarity in [-1, 1]
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_similar_match_serializes_index_text_score() {
        let m = SimilarMatch { index: 2, text: "hello", score: 0.5 };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json, serde_json::json!({ "index": 2, "text": "hello", "score": 0.5 }));
    }
}
