use thiserror::Error;

/// Errors raised by retrieval, embedding and corpus loading
#[derive(Error, Debug)]
pub enum SimilarityError {
    /// A vector does not have the dimension of the matrix it is compared against
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Corpus texts and embedding rows are not index-aligned
    #[error("Length mismatch: {rows} embedding rows but {texts} corpus texts")]
    LengthMismatch { rows: usize, texts: usize },

    #[error("top_n must be at least 1")]
    InvalidTopN,

    /// An embedder was asked to fit on nothing
    #[error("Cannot fit on an empty corpus")]
    EmptyCorpus,

    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// Malformed input file content (line number is 1-based)
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model, tokenizer or model-hub failure
    #[error("Model error: {0}")]
    Model(String),
}

pub type Result<T> = std::result::Result<T, SimilarityError>;

#[cfg(feature = "bert")]
impl From<candle_core::Error> for SimilarityError {
    fn from(err: candle_core::Error) -> Self {
        SimilarityError::Model(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SimilarityError::DimensionMismatch { expected: 3, actual: 2 };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 3, got 2");

        let err = SimilarityError::LengthMismatch { rows: 4, texts: 5 };
        assert_eq!(err.to_string(), "Length mismatch: 4 embedding rows but 5 corpus texts");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SimilarityError = io.into();
        assert!(matches!(err, SimilarityError::Io(_)));
    }
}
