//! Text-in, matches-out search over one embedding method

use crate::corpus::Corpus;
use crate::embeddings::Embedder;
use crate::error::Result;
use crate::search::{SimilarMatch, SimilarityRetriever};

/// Object-safe search handle, so several embedding methods can be queried side by side
pub trait TextSearch: Send + Sync {
    /// Human-readable method name, e.g. "TF-IDF"
    fn name(&self) -> &str;

    /// Embed already-preprocessed `text` and return the best `top_n` matches
    fn query(&self, text: &str, top_n: usize) -> Result<Vec<SimilarMatch<'_>>>;

    /// Number of corpus entries searched
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An embedder paired with the corpus matrix it produced
///
/// Corpus entries are embedded from their processed text; matches carry the
/// original text.
pub struct EmbeddedCorpus<E: Embedder> {
    name: String,
    embedder: E,
    retriever: SimilarityRetriever<E::Matrix>,
}

impl<E: Embedder> EmbeddedCorpus<E> {
    /// Embed every processed entry of `corpus` with `embedder`
    pub fn build(name: impl Into<String>, embedder: E, corpus: &Corpus) -> Result<Self> {
        let matrix = embedder.embed_corpus(&corpus.processed_texts())?;
        Self::from_parts(name, embedder, corpus, matrix)
    }

    /// Pair a precomputed `matrix` (row `i` = entry `i` of `corpus`) with its embedder
    pub fn from_parts(
        name: impl Into<String>,
        embedder: E,
        corpus: &Corpus,
        matrix: E::Matrix,
    ) -> Result<Self> {
        let name = name.into();
        let retriever = SimilarityRetriever::new(corpus.original_texts(), matrix)?;
        tracing::info!(method = %name, entries = retriever.len(), "embedded corpus ready");
        Ok(Self {
            name,
            embedder,
            retriever,
        })
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn retriever(&self) -> &SimilarityRetriever<E::Matrix> {
        &self.retriever
    }
}

impl<E> TextSearch for EmbeddedCorpus<E>
where
    E: Embedder + Send + Sync,
    E::Matrix: Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, text: &str, top_n: usize) -> Result<Vec<SimilarMatch<'_>>> {
        let query = self.embedder.embed_query(text)?;
        self.retriever.search(&query, top_n)
    }

    fn len(&self) -> usize {
        self.retriever.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::{TfidfVectorizer, WordVectors};
    use crate::preprocess::TextPreprocessor;
    use std::io::Cursor;

    fn corpus() -> Corpus {
        Corpus::from_texts(
            ["How do I learn Rust?", "Best pizza in Naples", "Learning Rust fast"],
            &TextPreprocessor::default(),
        )
    }

    #[test]
    fn test_tfidf_method_returns_original_text() {
        let corpus = corpus();
        let (matrix, tfidf) = TfidfVectorizer::new()
            .fit_and_embed(&corpus.processed_texts())
            .unwrap();
        let method = EmbeddedCorpus::from_parts("TF-IDF", tfidf, &corpus, matrix).unwrap();

        let results = method.query("rust", 2).unwrap();
        assert_eq!(method.name(), "TF-IDF");
        assert_eq!(results[0].text, "How do I learn Rust?");
        assert_eq!(corpus.processed(0), Some("how learn rust"));
        assert!(results.iter().all(|r| r.index != 1));
    }

    #[test]
    fn test_word_vector_method_as_trait_object() {
        let glove = "learn 1 0\nlearning 1 0\nrust 0 1\npizza -1 0\n";
        let vectors = WordVectors::from_reader(Cursor::new(glove)).unwrap();
        let method: Box<dyn TextSearch> =
            Box::new(EmbeddedCorpus::build("GloVe", vectors, &corpus()).unwrap());

        let results = method.query("pizza", 1).unwrap();
        assert_eq!(results[0].index, 1);
        assert_eq!(method.len(), 3);
        assert!(!method.is_empty());
    }
}
