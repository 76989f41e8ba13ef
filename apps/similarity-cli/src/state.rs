//! Application state for the similarity CLI
//!
//! Holds the corpus, the preprocessor and one embedded copy of the corpus per
//! embedding method.

use anyhow::{Context, Result};
use serde::Serialize;
use similarity_core::corpus::Corpus;
use similarity_core::embeddings::{TfidfVectorizer, WordVectors};
use similarity_core::preprocess::{Preprocessor, TextPreprocessor};
use similarity_core::search::{EmbeddedCorpus, SimilarMatch, TextSearch};
use similarity_core::SimilarityConfig;
use tracing::info;

/// Ranked matches from one embedding method
#[derive(Debug, Serialize)]
pub struct MethodResults<'a> {
    pub method: &'a str,
    pub matches: Vec<SimilarMatch<'a>>,
}

/// Shared application state
pub struct AppState {
    pub corpus: Corpus,
    pub preprocessor: TextPreprocessor,
    /// TF-IDF first, then any dense methods that were configured
    pub methods: Vec<Box<dyn TextSearch>>,
}

impl AppState {
    /// Load the corpus and build every configured embedding method
    pub fn new(config: &SimilarityConfig) -> Result<Self> {
        let preprocessor = TextPreprocessor::new(config.remove_stopwords);

        info!("Loading corpus from {:?}", config.dataset_path);
        let corpus = Corpus::from_question_pairs_csv(&config.dataset_path, config.max_rows, &preprocessor)
            .with_context(|| format!("failed to load corpus from {}", config.dataset_path.display()))?;

        let word_vectors = config
            .glove_path
            .as_deref()
            .map(WordVectors::load)
            .transpose()
            .context("failed to load GloVe vectors")?;

        let mut state = Self::with_methods(corpus, preprocessor, word_vectors)?;
        state.add_sentence_encoder(config)?;
        Ok(state)
    }

    /// Build state from an in-memory corpus. TF-IDF is always enabled.
    pub fn with_methods(
        corpus: Corpus,
        preprocessor: TextPreprocessor,
        word_vectors: Option<WordVectors>,
    ) -> Result<Self> {
        let mut methods: Vec<Box<dyn TextSearch>> = Vec::new();

        info!("Generating TF-IDF embeddings...");
        let (matrix, tfidf) = TfidfVectorizer::new()
            .fit_and_embed(&corpus.processed_texts())
            .context("failed to fit TF-IDF")?;
        methods.push(Box::new(EmbeddedCorpus::from_parts("TF-IDF", tfidf, &corpus, matrix)?));

        if let Some(vectors) = word_vectors {
            info!("Generating GloVe embeddings...");
            methods.push(Box::new(EmbeddedCorpus::build("GloVe", vectors, &corpus)?));
        }

        Ok(Self {
            corpus,
            preprocessor,
            methods,
        })
    }

    #[cfg(feature = "bert")]
    fn add_sentence_encoder(&mut self, config: &SimilarityConfig) -> Result<()> {
        use similarity_core::embeddings::bert::{SentenceEncoder, DEFAULT_MODEL_REPO};

        let model_path = match (&config.model_path, config.download_model) {
            (Some(path), _) => path.clone(),
            (None, true) => SentenceEncoder::download(DEFAULT_MODEL_REPO)?,
            (None, false) => return Ok(()),
        };

        info!("Generating BERT embeddings...");
        let encoder = SentenceEncoder::load(&model_path)
            .with_context(|| format!("failed to load sentence encoder from {}", model_path.display()))?;
        self.methods
            .push(Box::new(EmbeddedCorpus::build("BERT", encoder, &self.corpus)?));
        Ok(())
    }

    #[cfg(not(feature = "bert"))]
    fn add_sentence_encoder(&mut self, config: &SimilarityConfig) -> Result<()> {
        if config.model_path.is_some() || config.download_model {
            tracing::warn!("Sentence encoder requested but not compiled in; rebuild with --features bert");
        }
        Ok(())
    }

    /// Preprocess `text` and rank the corpus with every method
    pub fn query(&self, text: &str, top_n: usize) -> Result<Vec<MethodResults<'_>>> {
        let processed = self.preprocessor.preprocess(text);
        self.methods
            .iter()
            .map(|method| {
                Ok(MethodResults {
                    method: method.name(),
                    matches: method.query(&processed, top_n)?,
                })
            })
            .collect()
    }
}
