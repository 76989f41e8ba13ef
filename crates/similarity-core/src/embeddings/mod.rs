//! Embedding producers
//!
//! Every embedder turns text into vectors of one fixed dimension. The retriever
//! only sees the resulting [`EmbeddingMatrix`], so frequency-based (TF-IDF) and
//! dense pretrained vectors are interchangeable behind [`Embedder`].

pub mod tfidf;
pub mod word_vectors;
#[cfg(feature = "bert")]
pub mod bert;

pub use tfidf::{FittedTfidf, TfidfVectorizer};
pub use word_vectors::WordVectors;
#[cfg(feature = "bert")]
pub use bert::SentenceEncoder;

use crate::error::Result;
use crate::matrix::{DenseMatrix, EmbeddingMatrix};
use std::borrow::Borrow;

/// Produces corpus matrices and query vectors in one embedding space
pub trait Embedder {
    type Matrix: EmbeddingMatrix;
    /// Owned query vector, borrowable as a matrix row
    type Query: Borrow<<Self::Matrix as EmbeddingMatrix>::Row>;

    /// Dimension of every vector this embedder produces
    fn dimension(&self) -> usize;

    fn embed_query(&self, text: &str) -> Result<Self::Query>;

    /// One row per text, in order
    fn embed_corpus<S: AsRef<str>>(&self, texts: &[S]) -> Result<Self::Matrix>;
}

/// Stack per-text dense vectors into a matrix of `dim` columns
pub(crate) fn embed_dense<S, F>(dim: usize, texts: &[S], mut embed: F) -> Result<DenseMatrix>
where
    S: AsRef<str>,
    F: FnMut(&str) -> Result<Vec<f32>>,
{
    let mut matrix = DenseMatrix::empty(dim);
    for text in texts {
        matrix.push_row(&embed(text.as_ref())?)?;
    }
    Ok(matrix)
}
