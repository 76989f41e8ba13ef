//! Configuration management for corpus loading and retrieval
//!
//! Values come from environment variables with sensible defaults; callers
//! (such as the CLI) may override individual fields afterwards.

use std::path::PathBuf;
use std::str::FromStr;

use crate::corpus::DEFAULT_MAX_ROWS;
use crate::error::{Result, SimilarityError};
use crate::search::DEFAULT_TOP_N;

/// Retrieval session configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityConfig {
    /// Question-pair CSV to load the corpus from
    pub dataset_path: PathBuf,
    /// Maximum number of question-pair rows to read
    pub max_rows: usize,
    /// Results returned per method
    pub top_n: usize,
    /// Drop English stopwords during preprocessing
    pub remove_stopwords: bool,
    /// GloVe text file for averaged word-vector embeddings
    pub glove_path: Option<PathBuf>,
    /// Local BERT-family model directory for sentence embeddings
    pub model_path: Option<PathBuf>,
    /// Fetch the default sentence encoder from the Hugging Face Hub
    pub download_model: bool,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/quora.csv"),
            max_rows: DEFAULT_MAX_ROWS,
            top_n: DEFAULT_TOP_N,
            remove_stopwords: true,
            glove_path: None,
            model_path: None,
            download_model: false,
        }
    }
}

impl SimilarityConfig {
    /// Load configuration from environment variables
    ///
    /// Expected variables:
    /// - SIMILARITY_DATASET: Question-pair CSV path (default: "data/quora.csv")
    /// - SIMILARITY_MAX_ROWS: Row cap (default: 10000)
    /// - SIMILARITY_TOP_N: Results per method (default: 5)
    /// - SIMILARITY_REMOVE_STOPWORDS: "true"/"false" (default: true)
    /// - SIMILARITY_GLOVE_PATH: GloVe vectors file (optional)
    /// - SIMILARITY_MODEL_PATH: Sentence encoder directory (optional)
    /// - SIMILARITY_DOWNLOAD_MODEL: "true"/"false" (default: false)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading values through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            dataset_path: lookup("SIMILARITY_DATASET")
                .map(PathBuf::from)
                .unwrap_or(defaults.dataset_path),
            max_rows: parse_var(&lookup, "SIMILARITY_MAX_ROWS")?.unwrap_or(defaults.max_rows),
            top_n: parse_var(&lookup, "SIMILARITY_TOP_N")?.unwrap_or(defaults.top_n),
            remove_stopwords: parse_bool(&lookup, "SIMILARITY_REMOVE_STOPWORDS")?
                .unwrap_or(defaults.remove_stopwords),
            glove_path: lookup("SIMILARITY_GLOVE_PATH").map(PathBuf::from),
            model_path: lookup("SIMILARITY_MODEL_PATH").map(PathBuf::from),
            download_model: parse_bool(&lookup, "SIMILARITY_DOWNLOAD_MODEL")?
                .unwrap_or(defaults.download_model),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values no session can run with
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(SimilarityError::Config("top_n must be at least 1".to_string()));
        }
        if self.max_rows == 0 {
            return Err(SimilarityError::Config("max_rows must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| SimilarityError::Config(format!("{key}={raw:?}: {e}")))
        })
        .transpose()
}

fn parse_bool<F>(lookup: &F, key: &str) -> Result<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(SimilarityError::Config(format!("{key}={raw:?}: expected a boolean"))),
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SimilarityConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, SimilarityConfig::default());
        assert_eq!(config.top_n, 5);
        assert_eq!(config.max_rows, 10_000);
        assert!(config.remove_stopwords);
    }

    #[test]
    fn test_overrides() {
        let config = SimilarityConfig::from_lookup(lookup_from(&[
            ("SIMILARITY_DATASET", "/tmp/pairs.csv"),
            ("SIMILARITY_MAX_ROWS", "250"),
            ("SIMILARITY_TOP_N", " 3 "),
            ("SIMILARITY_REMOVE_STOPWORDS", "off"),
            ("SIMILARITY_GLOVE_PATH", "/tmp/glove.txt"),
        ]))
        .unwrap();

        assert_eq!(config.dataset_path, PathBuf::from("/tmp/pairs.csv"));
        assert_eq!(config.max_rows, 250);
        assert_eq!(config.top_n, 3);
        assert!(!config.remove_stopwords);
        assert_eq!(config.glove_path, Some(PathBuf::from("/tmp/glove.txt")));
        assert_eq!(config.model_path, None);
    }

    #[test]
    fn test_invalid_number() {
        let err = SimilarityConfig::from_lookup(lookup_from(&[("SIMILARITY_TOP_N", "many")]))
            .unwrap_err();
        assert!(matches!(err, SimilarityError::Config(_)));
    }

    #[test]
    fn test_invalid_bool() {
        let err = SimilarityConfig::from_lookup(lookup_from(&[(
            "SIMILARITY_REMOVE_STOPWORDS",
            "maybe",
        )]))
        .unwrap_err();
        assert!(matches!(err, SimilarityError::Config(_)));
    }

    #[test]
    fn test_zero_top_n_rejected() {
        let err = SimilarityConfig::from_lookup(lookup_from(&[("SIMILARITY_TOP_N", "0")]))
            .unwrap_err();
        assert!(matches!(err, SimilarityError::Config(_)));
    }
}
