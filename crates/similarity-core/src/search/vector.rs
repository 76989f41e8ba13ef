//! Top-N cosine similarity over an in-memory embedding matrix
//!
//! The scan is a plain linear pass: every row is scored against the query,
//! the scores are ranked, and the best `top_n` are returned with their texts.
//!
//! # Conventions
//!
//! - `sim = dot(q, r) / sqrt(dot(q, q) * dot(r, r))`, accumulated in f64
//! - If either magnitude is zero, or the quotient is not finite, the score is 0.0
//! - Finite scores are clamped to [-1, 1]
//! - Ranking compares the f64 scores; results carry them rounded to f32
//! - Ties rank by ascending corpus index
//! - `top_n == 0` is rejected with [`SimilarityError::InvalidTopN`]
//! - The query dimension is checked whenever the matrix has a known column
//!   count, even with no rows
//!
//! # Example
//!
//! ```
//! use similarity_core::matrix::DenseMatrix;
//! use similarity_core::search::find_similar;
//!
//! # fn main() -> similarity_core::Result<()> {
//! let matrix = DenseMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]])?;
//! let texts = ["east", "north"];
//!
//! let results = find_similar(&[0.9f32, 0.1][..], &matrix, &texts, 1)?;
//! assert_eq!(results[0].text, "east");
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SimilarityError};
use crate::matrix::{Embedding, EmbeddingMatrix};
use crate::search::SimilarMatch;
use std::borrow::Borrow;
use std::cmp::Ordering;

/// Cosine similarity between two vectors of the same representation
///
/// Zero-magnitude inputs score 0.0 instead of NaN.
pub fn cosine_similarity<E: Embedding + ?Sized>(a: &E, b: &E) -> f32 {
    cosine(a, a.dot(a), b) as f32
}

// Taking one square root of the product keeps identical vectors at exactly 1.0
fn cosine<E: Embedding + ?Sized>(query: &E, query_sq: f64, row: &E) -> f64 {
    let denom = (query_sq * row.dot(row)).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    let sim = query.dot(row) / denom;
    if !sim.is_finite() {
        return 0.0;
    }
    sim.clamp(-1.0, 1.0)
}

/// Rank `corpus` by cosine similarity to `query` and return the best `top_n`
///
/// `matrix` row `i` must be the embedding of `corpus[i]`.
///
/// # Errors
///
/// - [`SimilarityError::InvalidTopN`] if `top_n` is zero
/// - [`SimilarityError::LengthMismatch`] if the corpus and matrix are not aligned
/// - [`SimilarityError::DimensionMismatch`] if the query dimension differs from
///   the matrix dimension. A matrix with no rows and no columns accepts any query.
pub fn find_similar<'a, M, Q, S>(
    query: &Q,
    matrix: &M,
    corpus: &'a [S],
    top_n: usize,
) -> Result<Vec<SimilarMatch<'a>>>
where
    M: EmbeddingMatrix + ?Sized,
    Q: Borrow<M::Row> + ?Sized,
    S: AsRef<str>,
{
    if top_n == 0 {
        return Err(SimilarityError::InvalidTopN);
    }

    let rows = matrix.rows();
    if rows != corpus.len() {
        return Err(SimilarityError::LengthMismatch {
            rows,
            texts: corpus.len(),
        });
    }

    let query: &M::Row = query.borrow();
    let known_dim = rows > 0 || matrix.dim() > 0;
    if known_dim && query.dim() != matrix.dim() {
        return Err(SimilarityError::DimensionMismatch {
            expected: matrix.dim(),
            actual: query.dim(),
        });
    }
    if rows == 0 {
        return Ok(Vec::new());
    }

    let query_sq = query.dot(query);
    let mut scored: Vec<(usize, f64)> = (0..rows)
        .map(|i| (i, cosine(query, query_sq, matrix.row(i))))
        .collect();

    // Stable sort keeps ascending index order among equal scores
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(top_n);

    tracing::debug!(
        rows,
        top_n,
        best = scored.first().map(|&(_, s)| s),
        "similarity scan complete"
    );

    Ok(scored
        .into_iter()
        .map(|(index, score)| SimilarMatch {
            index,
            text: corpus[index].as_ref(),
            score: score as f32,
        })
        .collect())
}

/// A corpus paired with its embedding matrix
///
/// The row/text alignment is checked once at construction, so searches only
/// need to validate the query.
#[derive(Debug, Clone)]
pub struct SimilarityRetriever<M> {
    texts: Vec<String>,
    matrix: M,
}

impl<M: EmbeddingMatrix> SimilarityRetriever<M> {
    /// Pair `texts` with `matrix`
    ///
    /// # Errors
    ///
    /// Returns [`SimilarityError::LengthMismatch`] if the matrix row count
    /// differs from the number of texts.
    pub fn new(texts: Vec<String>, matrix: M) -> Result<Self> {
        if matrix.rows() != texts.len() {
            return Err(SimilarityError::LengthMismatch {
                rows: matrix.rows(),
                texts: texts.len(),
            });
        }
        Ok(Self { texts, matrix })
    }

    /// Top `top_n` texts by cosine similarity to `query`
    pub fn search<Q>(&self, query: &Q, top_n: usize) -> Result<Vec<SimilarMatch<'_>>>
    where
        Q: Borrow<M::Row> + ?Sized,
    {
        find_similar(query, &self.matrix, &self.texts, top_n)
    }

    /// The single best match, if the corpus is not empty
    pub fn best<Q>(&self, query: &Q) -> Result<Option<SimilarMatch<'_>>>
    where
        Q: Borrow<M::Row> + ?Sized,
    {
        Ok(self.search(query, 1)?.into_iter().next())
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn matrix(&self) -> &M {
        &self.matrix
    }
}
