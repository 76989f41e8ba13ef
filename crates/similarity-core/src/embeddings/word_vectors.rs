//! Averaged pretrained word vectors (GloVe text format)
//!
//! Each line of a GloVe file is a word followed by its vector components,
//! separated by spaces. A text is embedded as the mean of the vectors of its
//! known words, or the zero vector when none are known.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::embeddings::{embed_dense, Embedder};
use crate::error::{Result, SimilarityError};
use crate::matrix::DenseMatrix;

/// In-memory word vector table
#[derive(Debug, Clone)]
pub struct WordVectors {
    dim: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl WordVectors {
    /// Load a GloVe-format file
    ///
    /// # Errors
    ///
    /// - [`SimilarityError::Io`] if the file cannot be read
    /// - [`SimilarityError::Parse`] on a malformed line or inconsistent dimension
    /// - [`SimilarityError::EmptyCorpus`] if the file has no vectors
    pub fn load(path: &Path) -> Result<Self> {
        tracing::info!("Loading word vectors from {}", path.display());
        let file = File::open(path)?;
        let vectors = Self::from_reader(BufReader::new(file))?;
        tracing::info!(words = vectors.len(), dim = vectors.dim, "word vectors loaded");
        Ok(vectors)
    }

    /// Parse GloVe lines from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut dim = None;
        let mut vectors = HashMap::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = i + 1;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };

            let vector = parts
                .map(|v| {
                    v.parse::<f32>().map_err(|e| SimilarityError::Parse {
                        line: line_no,
                        message: format!("invalid component {v:?}: {e}"),
                    })
                })
                .collect::<Result<Vec<f32>>>()?;

            if vector.is_empty() {
                return Err(SimilarityError::Parse {
                    line: line_no,
                    message: format!("word {word:?} has no vector"),
                });
            }

            match dim {
                None => dim = Some(vector.len()),
                Some(expected) if expected != vector.len() => {
                    return Err(SimilarityError::Parse {
                        line: line_no,
                        message: format!("expected {expected} components, found {}", vector.len()),
                    });
                }
                Some(_) => {}
            }

            vectors.insert(word.to_string(), vector);
        }

        let dim = dim.ok_or(SimilarityError::EmptyCorpus)?;
        Ok(Self { dim, vectors })
    }

    /// Build directly from a word table. All vectors must share one dimension.
    pub fn from_map(vectors: HashMap<String, Vec<f32>>) -> Result<Self> {
        let dim = vectors
            .values()
            .next()
            .map(Vec::len)
            .ok_or(SimilarityError::EmptyCorpus)?;
        if dim == 0 {
            return Err(SimilarityError::InvalidVector("word vectors must not be empty".to_string()));
        }
        if let Some(bad) = vectors.values().find(|v| v.len() != dim) {
            return Err(SimilarityError::DimensionMismatch {
                expected: dim,
                actual: bad.len(),
            });
        }
        Ok(Self { dim, vectors })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.vectors.get(word).map(Vec::as_slice)
    }

    /// Mean of the vectors of the whitespace-separated words in `text`
    pub fn average(&self, text: &str) -> Vec<f32> {
        let mut sum = vec![0.0f32; self.dim];
        let mut known = 0usize;
        for vector in text.split_whitespace().filter_map(|w| self.vectors.get(w)) {
            for (acc, &v) in sum.iter_mut().zip(vector) {
                *acc += v;
            }
            known += 1;
        }
        if known > 0 {
            let n = known as f32;
            sum.iter_mut().for_each(|v| *v /= n);
        }
        sum
    }
}

impl Embedder for WordVectors {
    type Matrix = DenseMatrix;
    type Query = Vec<f32>;

    fn dimension(&self) -> usize {
        self.dim
    }

    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.average(text))
    }

    fn embed_corpus<S: AsRef<str>>(&self, texts: &[S]) -> Result<DenseMatrix> {
        embed_dense(self.dim, texts, |t| Ok(self.average(t)))
    }
}
