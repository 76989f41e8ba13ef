//! Question guessing game
//!
//! A target question is drawn at random from the corpus. The player types
//! guesses and sees the closest corpus questions per method; a guess whose
//! processed form equals the target's wins the round.

use std::io::{BufRead, Write};

use anyhow::{bail, Result};
use rand::Rng;
use similarity_core::corpus::Corpus;
use similarity_core::preprocess::Preprocessor;
use tracing::{debug, info};

use crate::repl::write_best_matches;
use crate::state::AppState;

const REVEAL: &str = ":reveal";
const QUIT: &str = ":quit";

/// Outcome of a single guess
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guess {
    /// Matches the target; the score went up
    Correct,
    /// Matches the target, but this round was already won
    AlreadySolved,
    Wrong,
}

/// Game progress: current target, round number and score
#[derive(Debug)]
pub struct GuessingGame<R> {
    rng: R,
    corpus_len: usize,
    target: usize,
    round: usize,
    score: usize,
    solved: bool,
}

impl<R: Rng> GuessingGame<R> {
    /// Start at round 1 with a random target drawn from `corpus_len` entries
    pub fn new(mut rng: R, corpus_len: usize) -> Result<Self> {
        if corpus_len == 0 {
            bail!("cannot play with an empty corpus");
        }
        let target = rng.random_range(0..corpus_len);
        Ok(Self {
            rng,
            corpus_len,
            target,
            round: 1,
            score: 0,
            solved: false,
        })
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn score(&self) -> usize {
        self.score
    }

    /// Compare a processed guess against the target's processed text.
    /// Each round scores at most once.
    pub fn guess(&mut self, corpus: &Corpus, processed_guess: &str) -> Guess {
        let hit = corpus
            .processed(self.target)
            .is_some_and(|target| target.trim() == processed_guess.trim());

        match (hit, self.solved) {
            (false, _) => Guess::Wrong,
            (true, true) => Guess::AlreadySolved,
            (true, false) => {
                self.solved = true;
                self.score += 1;
                Guess::Correct
            }
        }
    }

    /// End the round: return the old target index and draw a new one
    pub fn reveal(&mut self) -> usize {
        let previous = self.target;
        self.target = self.rng.random_range(0..self.corpus_len);
        self.round += 1;
        self.solved = false;
        debug!(round = self.round, target = self.target, "new round");
        previous
    }
}

/// Run the game until `:quit` or EOF
pub fn run_play<G, R, W>(state: &AppState, game: &mut GuessingGame<G>, mut reader: R, mut writer: W) -> Result<()>
where
    G: Rng,
    R: BufRead,
    W: Write,
{
    info!(entries = state.corpus.len(), "starting guessing game");
    writeln!(writer, "Guess the hidden question. Type {REVEAL} to give up or {QUIT} to stop.")?;

    let mut line = String::new();
    loop {
        write!(writer, "[Round {} | Score: {}] > ", game.round(), game.score())?;
        writer.flush()?;

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }

        let input = line.trim();
        match input {
            "" => continue,
            QUIT => break,
            REVEAL => {
                let previous = game.reveal();
                let original = state.corpus.original(previous).unwrap_or_default();
                writeln!(writer, "The target question was: {original}")?;
            }
            guess => {
                let results = state.query(guess, 1)?;
                write_best_matches(&mut writer, &results)?;

                let processed = state.preprocessor.preprocess(guess);
                match game.guess(&state.corpus, &processed) {
                    Guess::Correct => writeln!(writer, "Correct! You guessed the target question!")?,
                    Guess::AlreadySolved => writeln!(writer, "Already solved. Type {REVEAL} for the next round.")?,
                    Guess::Wrong => writeln!(writer, "Not the target question. Try again!")?,
                }
            }
        }
    }

    writeln!(writer, "Final score: {} after {} round(s)", game.score(), game.round())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use similarity_core::preprocess::TextPreprocessor;
    use std::io::Cursor;

    const QUESTIONS: [&str; 3] = [
        "How do I learn Rust?",
        "What is the best pizza in Naples?",
        "Why is the sky blue?",
    ];

    fn corpus() -> Corpus {
        Corpus::from_texts(QUESTIONS, &TextPreprocessor::default())
    }

    fn game(seed: u64) -> GuessingGame<StdRng> {
        GuessingGame::new(StdRng::seed_from_u64(seed), QUESTIONS.len()).unwrap()
    }

    #[test]
    fn test_new_game_starts_at_round_one() {
        let game = game(7);
        assert_eq!(game.round(), 1);
        assert_eq!(game.score(), 0);
        assert!(game.target() < QUESTIONS.len());
    }

    #[test]
    fn test_same_seed_same_targets() {
        let mut a = game(42);
        let mut b = game(42);
        for _ in 0..10 {
            assert_eq!(a.target(), b.target());
            a.reveal();
            b.reveal();
        }
    }

    #[test]
    fn test_empty_corpus_rejected() {
        assert!(GuessingGame::new(StdRng::seed_from_u64(1), 0).is_err());
    }

    #[test]
    fn test_correct_guess_scores_once_per_round() {
        let corpus = corpus();
        let mut game = game(3);
        let target = corpus.processed(game.target()).unwrap().to_string();

        assert_eq!(game.guess(&corpus, &format!("  {target} ")), Guess::Correct);
        assert_eq!(game.guess(&corpus, &target), Guess::AlreadySolved);
        assert_eq!(game.score(), 1);
        assert_eq!(game.round(), 1);
    }

    #[test]
    fn test_wrong_guess_keeps_score() {
        let corpus = corpus();
        let mut game = game(3);
        assert_eq!(game.guess(&corpus, "completely unrelated"), Guess::Wrong);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_reveal_advances_round() {
        let corpus = corpus();
        let mut game = game(11);
        let first = game.target();

        assert_eq!(game.reveal(), first);
        assert_eq!(game.round(), 2);

        let target = corpus.processed(game.target()).unwrap().to_string();
        assert_eq!(game.guess(&corpus, &target), Guess::Correct);
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn test_run_play_session() {
        let state = AppState::with_methods(corpus(), TextPreprocessor::default(), None).unwrap();
        let mut game = game(5);
        let target = QUESTIONS[game.target()];

        let input = format!("{target}\n:reveal\n:quit\n");
        let mut out = Vec::new();
        run_play(&state, &mut game, Cursor::new(input), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("Correct! You guessed the target question!"));
        assert!(out.contains(&format!("The target question was: {target}")));
        assert!(out.contains("Final score: 1 after 2 round(s)"));
    }
}
