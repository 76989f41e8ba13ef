//! TF-IDF sparse embeddings
//!
//! Follows the conventional vectorizer defaults so scores line up with the
//! usual Python tooling:
//!
//! - tokens are runs of two or more word characters in lowercased text
//! - vocabulary columns are assigned in lexicographic term order
//! - `idf(t) = ln((1 + n) / (1 + df(t))) + 1` (smoothed)
//! - term frequency is the raw count (or `1 + ln(count)` with sublinear tf)
//! - every row is L2-normalized
//!
//! # Example
//!
//! ```
//! use similarity_core::embeddings::{Embedder, TfidfVectorizer};
//! use similarity_core::search::find_similar;
//!
//! # fn main() -> similarity_core::Result<()> {
//! let corpus = ["how to learn rust", "best pizza in town", "learning rust quickly"];
//! let (matrix, tfidf) = TfidfVectorizer::new().fit_and_embed(&corpus)?;
//!
//! let query = tfidf.embed_query("rust")?;
//! let results = find_similar(&query, &matrix, &corpus, 2)?;
//! assert_ne!(results[0].index, 1);
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, HashMap};

use lazy_static::lazy_static;
use regex::Regex;

use crate::embeddings::Embedder;
use crate::error::{Result, SimilarityError};
use crate::matrix::{SparseMatrix, SparseVector};

lazy_static! {
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\b\w\w+\b").unwrap();
}

/// Split text into lowercase vocabulary tokens
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Unfitted TF-IDF settings
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    sublinear_tf: bool,
    min_df: usize,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self {
            sublinear_tf: false,
            min_df: 1,
        }
    }
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `1 + ln(tf)` instead of the raw term count
    pub fn with_sublinear_tf(mut self, sublinear_tf: bool) -> Self {
        self.sublinear_tf = sublinear_tf;
        self
    }

    /// Ignore terms that appear in fewer than `min_df` documents
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df.max(1);
        self
    }

    /// Learn the vocabulary and idf weights from `corpus`
    ///
    /// # Errors
    ///
    /// Returns [`SimilarityError::EmptyCorpus`] if the corpus has no documents
    /// or no document yields a surviving term.
    pub fn fit<S: AsRef<str>>(&self, corpus: &[S]) -> Result<FittedTfidf> {
        if corpus.is_empty() {
            return Err(SimilarityError::EmptyCorpus);
        }

        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for doc in corpus {
            let mut terms = tokenize(doc.as_ref());
            terms.sort_unstable();
            terms.dedup();
            for term in terms {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n = corpus.len() as f64;
        let mut vocabulary = HashMap::new();
        let mut idf = Vec::new();
        // BTreeMap iteration gives lexicographic column order
        for (term, df) in document_frequency {
            if df < self.min_df {
                continue;
            }
            vocabulary.insert(term, idf.len());
            idf.push((((1.0 + n) / (1.0 + df as f64)).ln() + 1.0) as f32);
        }

        if vocabulary.is_empty() {
            return Err(SimilarityError::EmptyCorpus);
        }

        tracing::info!(
            documents = corpus.len(),
            vocabulary = vocabulary.len(),
            "fitted tf-idf vectorizer"
        );

        Ok(FittedTfidf {
            vocabulary,
            idf,
            sublinear_tf: self.sublinear_tf,
        })
    }

    /// Fit on `corpus` and embed it in one pass
    ///
    /// Returns the corpus matrix together with the fitted transform, which is
    /// reused to embed queries into the same space.
    pub fn fit_and_embed<S: AsRef<str>>(&self, corpus: &[S]) -> Result<(SparseMatrix, FittedTfidf)> {
        let fitted = self.fit(corpus)?;
        let matrix = fitted.embed_corpus(corpus)?;
        Ok((matrix, fitted))
    }
}

/// A fitted TF-IDF transform
#[derive(Debug, Clone)]
pub struct FittedTfidf {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    sublinear_tf: bool,
}

impl FittedTfidf {
    /// Embed one text. Terms outside the vocabulary are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, u32> = HashMap::new();
        for term in tokenize(text) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_insert(0) += 1;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(column, count)| {
                let tf = if self.sublinear_tf {
                    1.0 + (count as f32).ln()
                } else {
                    count as f32
                };
                (column, tf * self.idf[column])
            })
            .collect();

        // Columns come from the vocabulary, so they are always in range
        let mut vector = SparseVector::new(self.idf.len(), entries)
            .unwrap_or_else(|_| SparseVector::zeros(self.idf.len()));
        vector.normalize();
        vector
    }

    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }

    /// Column assigned to `term`, if it is in the vocabulary
    pub fn column(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Learned idf weight for `term`
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.column(term).map(|c| self.idf[c])
    }
}

impl Embedder for FittedTfidf {
    type Matrix = SparseMatrix;
    type Query = SparseVector;

    fn dimension(&self) -> usize {
        self.vocabulary_len()
    }

    fn embed_query(&self, text: &str) -> Result<SparseVector> {
        Ok(self.transform(text))
    }

    fn embed_corpus<S: AsRef<str>>(&self, texts: &[S]) -> Result<SparseMatrix> {
        let rows = texts.iter().map(|t| self.transform(t.as_ref())).collect();
        SparseMatrix::from_rows(self.vocabulary_len(), rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{Embedding, EmbeddingMatrix};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tokenize_drops_single_characters() {
        assert_eq!(tokenize("I ate a BIG apple, ok?"), vec!["ate", "big", "apple", "ok"]);
    }

    #[test]
    fn test_vocabulary_is_lexicographic() {
        let fitted = TfidfVectorizer::new().fit(&["zebra apple", "mango"]).unwrap();
        assert_eq!(fitted.column("apple"), Some(0));
        assert_eq!(fitted.column("mango"), Some(1));
        assert_eq!(fitted.column("zebra"), Some(2));
        assert_eq!(fitted.column("kiwi"), None);
    }

    #[test]
    fn test_smooth_idf_values() {
        let (matrix, fitted) = TfidfVectorizer::new()
            .fit_and_embed(&["apple banana", "apple cherry"])
            .unwrap();

        // df(apple) = 2 -> ln(3/3) + 1; df(banana) = 1 -> ln(3/2) + 1
        assert!((fitted.idf("apple").unwrap() - 1.0).abs() < 1e-6);
        assert!((fitted.idf("banana").unwrap() - 1.405_465).abs() < 1e-5);

        let row = matrix.row(0);
        assert!((row.get(0) - 0.579_739).abs() < 1e-4);
        assert!((row.get(1) - 0.814_802).abs() < 1e-4);
        assert_eq!(row.get(2), 0.0);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let (matrix, _) = TfidfVectorizer::new()
            .fit_and_embed(&["the cat sat", "the dog ran far away", "cat cat cat"])
            .unwrap();
        for row in matrix.iter_rows() {
            assert!((row.norm() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_unknown_terms_give_zero_vector() {
        let fitted = TfidfVectorizer::new().fit(&["apple banana"]).unwrap();
        let query = fitted.embed_query("kiwi").unwrap();
        assert_eq!(query.nnz(), 0);
        assert_eq!(query.dim(), 2);
    }

    #[test]
    fn test_sublinear_tf() {
        let fitted = TfidfVectorizer::new()
            .with_sublinear_tf(true)
            .fit(&["apple banana", "banana"])
            .unwrap();
        let v = fitted.transform("apple apple apple banana");
        // Repetition is dampened but still weighted above a single occurrence
        assert!(v.get(0) > v.get(1));
    }

    #[test]
    fn test_min_df() {
        let fitted = TfidfVectorizer::new()
            .with_min_df(2)
            .fit(&["apple banana", "apple cherry"])
            .unwrap();
        assert_eq!(fitted.vocabulary_len(), 1);
        assert_eq!(fitted.column("apple"), Some(0));
    }

    #[test]
    fn test_empty_corpus_is_error() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            TfidfVectorizer::new().fit(&empty),
            Err(SimilarityError::EmptyCorpus)
        ));
        assert!(matches!(
            TfidfVectorizer::new().fit(&["a b c"]),
            Err(SimilarityError::EmptyCorpus)
        ));
    }
}
