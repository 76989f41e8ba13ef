//! Question similarity CLI
//!
//! Entry point for one-shot queries, the ask loop and the guessing game.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use similarity_core::SimilarityConfig;
use similarity_cli::game::{run_play, GuessingGame};
use similarity_cli::repl::run_ask;
use similarity_cli::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "similarity")]
#[command(version, about = "Find the most similar questions in a question-pair corpus")]
struct Cli {
    /// Question-pair CSV (question1, question2 columns)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Maximum number of CSV rows to load
    #[arg(long, global = true)]
    max_rows: Option<usize>,

    /// GloVe vectors file to enable the word-vector method
    #[arg(long, global = true)]
    glove: Option<PathBuf>,

    /// Sentence encoder model directory to enable the BERT method
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Download the default sentence encoder from the Hugging Face Hub
    #[arg(long, global = true)]
    download_model: bool,

    /// Keep stopwords during preprocessing
    #[arg(long, global = true)]
    keep_stopwords: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank the corpus against a single question
    Query {
        text: String,

        /// Matches per method (defaults to the configured top N)
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask questions interactively, one per line
    Ask,
    /// Play the question guessing game
    Play {
        /// Seed for target selection
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl Cli {
    fn config(&self) -> Result<SimilarityConfig> {
        let mut config = SimilarityConfig::from_env().context("invalid environment configuration")?;

        if let Some(dataset) = &self.dataset {
            config.dataset_path = dataset.clone();
        }
        if let Some(max_rows) = self.max_rows {
            config.max_rows = max_rows;
        }
        if let Some(glove) = &self.glove {
            config.glove_path = Some(glove.clone());
        }
        if let Some(model) = &self.model {
            config.model_path = Some(model.clone());
        }
        config.download_model |= self.download_model;
        if self.keep_stopwords {
            config.remove_stopwords = false;
        }
        if let Command::Query { top_n: Some(top_n), .. } = &self.command {
            config.top_n = *top_n;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Results go to stdout, logs to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    tracing::info!("Starting similarity v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.config()?;
    let state = AppState::new(&config)?;
    tracing::info!(
        entries = state.corpus.len(),
        methods = state.methods.len(),
        "corpus ready"
    );

    let stdin = io::stdin();
    let stdout = io::stdout();

    match cli.command {
        Command::Query { text, json, .. } => {
            let results = state.query(&text, config.top_n)?;
            let mut out = stdout.lock();
            if json {
                serde_json::to_writer_pretty(&mut out, &results)?;
                writeln!(out)?;
            } else {
                for method in &results {
                    writeln!(out, "{}", method.method)?;
                    for m in &method.matches {
                        writeln!(out, "  {:.4} | {}", m.score, m.text)?;
                    }
                }
            }
        }
        Command::Ask => run_ask(&state, stdin.lock(), stdout.lock())?,
        Command::Play { seed } => {
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            let mut game = GuessingGame::new(rng, state.corpus.len())?;
            run_play(&state, &mut game, stdin.lock(), stdout.lock())?;
        }
    }

    Ok(())
}
