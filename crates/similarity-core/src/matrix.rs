//! Embedding vectors and matrices
//!
//! The retriever never cares how vectors were produced. It only needs a dot
//! product and a magnitude per row, so both representations used in this crate
//! implement the same two traits:
//!
//! - [`DenseMatrix`] rows are `[f32]` slices (word vectors, sentence encoders)
//! - [`SparseMatrix`] rows are [`SparseVector`]s (TF-IDF)

use crate::error::{Result, SimilarityError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single fixed-dimension embedding vector
pub trait Embedding {
    /// Number of components (columns)
    fn dim(&self) -> usize;

    /// Dot product, accumulated in f64
    fn dot(&self, other: &Self) -> f64;

    /// L2 magnitude
    fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }
}

/// N index-aligned rows sharing one dimension
pub trait EmbeddingMatrix {
    type Row: Embedding + ?Sized;

    /// Number of rows (N)
    fn rows(&self) -> usize;

    /// Shared row dimension (D)
    fn dim(&self) -> usize;

    /// Row `index`. Panics when out of bounds, like slice indexing.
    fn row(&self, index: usize) -> &Self::Row;
}

impl Embedding for [f32] {
    fn dim(&self) -> usize {
        self.len()
    }

    fn dot(&self, other: &Self) -> f64 {
        self.iter()
            .zip(other.iter())
            .map(|(&a, &b)| f64::from(a) * f64::from(b))
            .sum()
    }
}

/// Row-major dense matrix stored in one contiguous buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseMatrix {
    dim: usize,
    data: Vec<f32>,
}

impl DenseMatrix {
    /// An empty matrix with a known column count
    pub fn empty(dim: usize) -> Self {
        Self { dim, data: Vec::new() }
    }

    /// Build from per-row vectors. All rows must share the first row's length,
    /// which must be non-zero.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dim = rows.first().map(Vec::len).unwrap_or(0);
        if dim == 0 && !rows.is_empty() {
            return Err(zero_width_row());
        }
        let mut data = Vec::with_capacity(dim * rows.len());
        for row in rows {
            if row.len() != dim {
                return Err(SimilarityError::DimensionMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self { dim, data })
    }

    /// Append one row, checking its dimension
    pub fn push_row(&mut self, row: &[f32]) -> Result<()> {
        if self.dim == 0 {
            return Err(zero_width_row());
        }
        if row.len() != self.dim {
            return Err(SimilarityError::DimensionMismatch {
                expected: self.dim,
                actual: row.len(),
            });
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.dim.max(1))
    }
}

// Row count is derived from the buffer length, so rows need at least one column
fn zero_width_row() -> SimilarityError {
    SimilarityError::InvalidVector("dense rows must have at least one component".to_string())
}

impl EmbeddingMatrix for DenseMatrix {
    type Row = [f32];

    fn rows(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn row(&self, index: usize) -> &[f32] {
        &self.data[index * self.dim..(index + 1) * self.dim]
    }
}

/// Sparse vector of `(column, value)` entries sorted by column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    /// Build from unordered entries. Duplicate columns are summed.
    pub fn new(dim: usize, mut entries: Vec<(usize, f32)>) -> Result<Self> {
        if let Some(&(column, _)) = entries.iter().find(|(column, _)| *column >= dim) {
            return Err(SimilarityError::InvalidVector(format!(
                "column {column} out of range for dimension {dim}"
            )));
        }

        entries.sort_by_key(|&(column, _)| column);
        let mut merged: Vec<(usize, f32)> = Vec::with_capacity(entries.len());
        for (column, value) in entries {
            match merged.last_mut() {
                Some(last) if last.0 == column => last.1 += value,
                _ => merged.push((column, value)),
            }
        }

        Ok(Self { dim, entries: merged })
    }

    /// The all-zero vector
    pub fn zeros(dim: usize) -> Self {
        Self { dim, entries: Vec::new() }
    }

    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Value at `column`, zero when absent
    pub fn get(&self, column: usize) -> f32 {
        self.entries
            .binary_search_by_key(&column, |&(c, _)| c)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    /// Expand into a dense vector
    pub fn to_dense(&self) -> Vec<f32> {
        let mut dense = vec![0.0; self.dim];
        for &(column, value) in &self.entries {
            dense[column] = value;
        }
        dense
    }

    /// Scale in place so the L2 norm is 1. Zero vectors are left untouched.
    pub(crate) fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for entry in &mut self.entries {
                entry.1 = (f64::from(entry.1) / norm) as f32;
            }
        }
    }
}

impl Embedding for SparseVector {
    fn dim(&self) -> usize {
        self.dim
    }

    fn dot(&self, other: &Self) -> f64 {
        // Merge-join over the sorted columns
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f64;
        while i < self.entries.len() && j < other.entries.len() {
            let (ca, va) = self.entries[i];
            let (cb, vb) = other.entries[j];
            match ca.cmp(&cb) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    sum += f64::from(va) * f64::from(vb);
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Sparse matrix stored as one [`SparseVector`] per row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    dim: usize,
    rows: Vec<SparseVector>,
}

impl SparseMatrix {
    pub fn empty(dim: usize) -> Self {
        Self { dim, rows: Vec::new() }
    }

    /// Build from rows that must all have dimension `dim`
    pub fn from_rows(dim: usize, rows: Vec<SparseVector>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|r| r.dim != dim) {
            return Err(SimilarityError::DimensionMismatch {
                expected: dim,
                actual: bad.dim,
            });
        }
        Ok(Self { dim, rows })
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &SparseVector> {
        self.rows.iter()
    }
}

impl EmbeddingMatrix for SparseMatrix {
    type Row = SparseVector;

    fn rows(&self) -> usize {
        self.rows.len()
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn row(&self, index: usize) -> &SparseVector {
        &self.rows[index]
    }
}
