//! End-to-end retrieval over small question corpora, through each embedder

use pretty_assertions::assert_eq;
use similarity_core::corpus::Corpus;
use similarity_core::embeddings::{Embedder, TfidfVectorizer, WordVectors};
use similarity_core::preprocess::{Preprocessor, TextPreprocessor};
use similarity_core::search::{find_similar, EmbeddedCorpus, TextSearch};
use std::io::Cursor;

const CORPUS: [&str; 3] = ["cat sat on mat", "dog ran in park", "cat played with yarn"];

#[test]
fn tfidf_prefers_lexical_overlap() {
    let (matrix, tfidf) = TfidfVectorizer::new().fit_and_embed(&CORPUS).unwrap();
    let query = tfidf.embed_query("cat playing").unwrap();

    let results = find_similar(&query, &matrix, &CORPUS, 2).unwrap();

    let order: Vec<usize> = results.iter().map(|r| r.index).collect();
    assert_eq!(order, vec![0, 2]);
    assert_eq!(results[0].text, "cat sat on mat");
    assert!(results[0].score >= results[1].score);
    assert!(results[1].score > 0.0);
}

#[test]
fn tfidf_ranking_follows_shared_terms() {
    let (matrix, tfidf) = TfidfVectorizer::new().fit_and_embed(&CORPUS).unwrap();
    let query = tfidf.embed_query("cat played").unwrap();

    let results = find_similar(&query, &matrix, &CORPUS, 3).unwrap();

    assert_eq!(results[0].index, 2);
    assert_eq!(results[1].index, 0);
    assert_eq!(results[2].index, 1);
    assert_eq!(results[2].score, 0.0);
}

#[test]
fn word_vectors_rank_semantic_neighbours() {
    // Two-dimensional toy space: axis 0 is "feline", axis 1 is "canine"
    let glove = "cat 1 0\nkitten 0.9 0.1\nyarn 0.8 0\ndog 0 1\npark 0 0.5\nmat 0.5 0\n";
    let vectors = WordVectors::from_reader(Cursor::new(glove)).unwrap();
    let matrix = vectors.embed_corpus(&CORPUS).unwrap();

    let query = vectors.embed_query("kitten").unwrap();
    let results = find_similar(&query, &matrix, &CORPUS, 2).unwrap();

    assert!(results.iter().all(|r| r.index != 1));
    assert!(results[0].score > 0.9);
}

#[test]
fn identical_question_matches_itself() {
    let preprocessor = TextPreprocessor::default();
    let corpus = Corpus::from_texts(
        [
            "How can I improve my English?",
            "What is the capital of France?",
            "How do I get better at English speaking?",
            "Which city is the capital of France?",
        ],
        &preprocessor,
    );
    let (matrix, tfidf) = TfidfVectorizer::new()
        .fit_and_embed(&corpus.processed_texts())
        .unwrap();
    let method = EmbeddedCorpus::from_parts("TF-IDF", tfidf, &corpus, matrix).unwrap();

    let guess = preprocessor.preprocess("what is the CAPITAL of france");
    let results = method.query(&guess, 2).unwrap();

    assert_eq!(results[0].index, 1);
    assert!((results[0].score - 1.0).abs() < 1e-5);
    assert_eq!(results[1].index, 3);
}
