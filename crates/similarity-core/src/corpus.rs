//! Ordered text corpus
//!
//! Entry `i` of a corpus is row `i` of every embedding matrix built from it.
//! Each entry keeps the original text for display next to the preprocessed
//! text that gets embedded.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimilarityError};
use crate::preprocess::Preprocessor;

/// Default cap on question-pair rows read from a dataset
pub const DEFAULT_MAX_ROWS: usize = 10_000;

/// One corpus entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub original: String,
    pub processed: String,
}

/// Immutable, index-ordered collection of texts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

/// A row of a question-pair dataset; extra columns are ignored
#[derive(Debug, Deserialize)]
struct QuestionPair {
    question1: Option<String>,
    question2: Option<String>,
}

impl Corpus {
    /// Build from raw texts, in order
    pub fn from_texts<I, S>(texts: I, preprocessor: &dyn Preprocessor) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = texts
            .into_iter()
            .map(|text| {
                let original = text.into();
                let processed = preprocessor.preprocess(&original);
                CorpusEntry { original, processed }
            })
            .collect();
        Self { entries }
    }

    /// Load a question-pair CSV with `question1` and `question2` columns
    ///
    /// - rows where either question is missing or blank are dropped
    /// - only the first `max_rows` surviving rows are used
    /// - all `question1` values come first, then all `question2` values
    /// - duplicate questions keep their first occurrence
    pub fn from_question_pairs_csv(
        path: &Path,
        max_rows: usize,
        preprocessor: &dyn Preprocessor,
    ) -> Result<Self> {
        tracing::info!("Loading question pairs from {}", path.display());

        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?;
        for column in ["question1", "question2"] {
            if !headers.iter().any(|h| h == column) {
                return Err(SimilarityError::Parse {
                    line: 1,
                    message: format!("missing column {column:?}"),
                });
            }
        }

        let mut firsts = Vec::new();
        let mut seconds = Vec::new();

        for record in reader.deserialize::<QuestionPair>() {
            if firsts.len() >= max_rows {
                break;
            }
            let pair = record?;
            match (non_blank(pair.question1), non_blank(pair.question2)) {
                (Some(q1), Some(q2)) => {
                    firsts.push(q1);
                    seconds.push(q2);
                }
                _ => continue,
            }
        }

        let mut seen = HashSet::new();
        let unique: Vec<String> = firsts
            .into_iter()
            .chain(seconds)
            .filter(|q| seen.insert(q.clone()))
            .collect();

        let corpus = Self::from_texts(unique, preprocessor);
        tracing::info!(questions = corpus.len(), "corpus loaded");
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CorpusEntry> {
        self.entries.get(index)
    }

    pub fn original(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.original.as_str())
    }

    pub fn processed(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.processed.as_str())
    }

    /// Processed texts in corpus order, ready for embedding
    pub fn processed_texts(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.processed.clone()).collect()
    }

    pub fn original_texts(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.original.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CorpusEntry> {
        self.entries.iter()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::{Identity, TextPreprocessor};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_from_texts_keeps_order_and_both_forms() {
        let corpus = Corpus::from_texts(["Hello, World!", "Bye"], &TextPreprocessor::new(false));
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.original(0), Some("Hello, World!"));
        assert_eq!(corpus.processed(0), Some("hello world"));
        assert_eq!(corpus.processed_texts(), vec!["hello world", "bye"]);
        assert_eq!(corpus.original(2), None);
    }

    #[test]
    fn test_question_pairs_order_and_dedup() {
        let file = write_csv(
            "id,qid1,qid2,question1,question2,is_duplicate\n\
             0,1,2,What is Rust?,What is Go?,0\n\
             1,3,4,How to cook rice?,What is Rust?,0\n\
             2,5,6,Why is the sky blue?,How to cook rice?,1\n",
        );

        let corpus = Corpus::from_question_pairs_csv(file.path(), 100, &Identity).unwrap();

        assert_eq!(
            corpus.original_texts(),
            vec![
                "What is Rust?",
                "How to cook rice?",
                "Why is the sky blue?",
                "What is Go?",
            ]
        );
    }

    #[test]
    fn test_question_pairs_drop_incomplete_rows() {
        let file = write_csv(
            "question1,question2\n\
             first a,first b\n\
             ,missing one\n\
             \"   \",blank one\n\
             second a,second b\n",
        );

        let corpus = Corpus::from_question_pairs_csv(file.path(), 100, &Identity).unwrap();
        assert_eq!(
            corpus.original_texts(),
            vec!["first a", "second a", "first b", "second b"]
        );
    }

    #[test]
    fn test_question_pairs_max_rows() {
        let file = write_csv("question1,question2\na1,b1\n,skip\na2,b2\na3,b3\n");

        let corpus = Corpus::from_question_pairs_csv(file.path(), 2, &Identity).unwrap();
        assert_eq!(corpus.original_texts(), vec!["a1", "a2", "b1", "b2"]);
    }

    #[test]
    fn test_missing_column_is_error() {
        let file = write_csv("title,body\na,b\n");
        let err = Corpus::from_question_pairs_csv(file.path(), 10, &Identity).unwrap_err();
        assert!(matches!(err, SimilarityError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = Corpus::from_question_pairs_csv(
            Path::new("/nonexistent/questions.csv"),
            10,
            &Identity,
        );
        assert!(result.is_err());
    }
}
