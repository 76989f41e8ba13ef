//! Similarity Core - Cosine-similarity retrieval over in-memory text corpora
//!
//! This crate provides:
//! - The top-N cosine similarity retriever (`search`)
//! - Dense and sparse embedding matrices (`matrix`)
//! - TF-IDF, averaged word-vector and (optionally) BERT embedders
//! - Text preprocessing and question-pair corpus loading
//! - Configuration management

pub mod config;
pub mod corpus;
pub mod embeddings;
pub mod error;
pub mod matrix;
pub mod preprocess;
pub mod search;

// Re-export commonly used types
pub use config::SimilarityConfig;
pub use corpus::Corpus;
pub use embeddings::{Embedder, FittedTfidf, TfidfVectorizer, WordVectors};
pub use error::{Result, SimilarityError};
pub use matrix::{DenseMatrix, Embedding, EmbeddingMatrix, SparseMatrix, SparseVector};
pub use preprocess::{Preprocessor, TextPreprocessor};
pub use search::{
    find_similar, EmbeddedCorpus, SimilarMatch, SimilarityRetriever, TextSearch, DEFAULT_TOP_N,
};
